#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! FIR (First Information Report) record types and category taxonomy.
//!
//! This crate defines the canonical FIR shape used across the whole
//! `SafeCity` workspace: the fixed crime type, status, and priority
//! enumerations, the stored record and its create/patch payloads, and the
//! importable field set with the spreadsheet header synonyms that map onto
//! each field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Crime category recorded on an FIR.
///
/// Parsing is exact: `"theft"` or `"Cyber crime"` are not accepted.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum FirType {
    /// Unlawful taking of property
    Theft,
    /// Physical attack on a person
    Assault,
    /// Taking property by force or threat
    Robbery,
    /// Deception for financial gain
    Fraud,
    /// Offenses committed through computers or networks
    #[serde(rename = "Cyber Crime")]
    #[strum(serialize = "Cyber Crime")]
    CyberCrime,
    /// Willful destruction or damage of property
    Vandalism,
    /// Anything not fitting the categories above
    Other,
}

impl FirType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Theft,
            Self::Assault,
            Self::Robbery,
            Self::Fraud,
            Self::CyberCrime,
            Self::Vandalism,
            Self::Other,
        ]
    }
}

/// Investigation status of an FIR.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FirStatus {
    /// Registered, not yet picked up
    #[default]
    Open,
    /// Actively being investigated
    Investigating,
    /// Resolved
    Closed,
}

impl FirStatus {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Open, Self::Investigating, Self::Closed]
    }
}

/// Handling priority of an FIR.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FirPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl FirPriority {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

/// The canonical importable FIR fields.
///
/// Each field carries the list of spreadsheet header spellings that are
/// accepted for it during import (compared case-insensitively after
/// trimming).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum FirField {
    Date,
    Time,
    Type,
    Location,
    Complainant,
    Status,
    Priority,
    Officer,
    Description,
    Evidence,
    Notes,
}

impl FirField {
    /// Returns all variants of this enum, in normalization order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Date,
            Self::Time,
            Self::Type,
            Self::Location,
            Self::Complainant,
            Self::Status,
            Self::Priority,
            Self::Officer,
            Self::Description,
            Self::Evidence,
            Self::Notes,
        ]
    }

    /// Lower-case header spellings accepted for this field. The first entry
    /// is the canonical header.
    #[must_use]
    pub const fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::Date => &["date", "fir date", "incident date"],
            Self::Time => &["time", "fir time", "incident time"],
            Self::Type => &["type", "fir type", "crime type"],
            Self::Location => &["location", "place", "incident location"],
            Self::Complainant => &["complainant", "complainant name", "reporter"],
            Self::Status => &["status", "fir status"],
            Self::Priority => &["priority", "priority level"],
            Self::Officer => &["officer", "officer name", "assigned officer"],
            Self::Description => &["description", "details", "incident description"],
            Self::Evidence => &["evidence", "evidence collected"],
            Self::Notes => &["notes", "remarks", "additional notes"],
        }
    }

    /// Human-readable label used in error messages and export headers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Type => "Type",
            Self::Location => "Location",
            Self::Complainant => "Complainant",
            Self::Status => "Status",
            Self::Priority => "Priority",
            Self::Officer => "Officer",
            Self::Description => "Description",
            Self::Evidence => "Evidence",
            Self::Notes => "Notes",
        }
    }

    /// Returns `true` if `header` is one of the accepted spellings for this
    /// field.
    #[must_use]
    pub fn matches_header(self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        self.synonyms().iter().any(|s| *s == header)
    }
}

/// A stored FIR record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirRecord {
    /// Unique human-readable identifier (`FIR-<year>-<n>`).
    pub report_id: String,
    /// Calendar date of the incident, as entered.
    pub date: String,
    /// Time of the incident (`HH:MM` or `HH:MM:SS`).
    pub time: String,
    /// Crime category.
    #[serde(rename = "type")]
    pub fir_type: FirType,
    pub location: String,
    pub complainant: String,
    pub status: FirStatus,
    pub priority: FirPriority,
    /// Officer assigned to the case.
    pub officer: String,
    pub description: String,
    pub evidence: String,
    pub notes: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
}

impl FirRecord {
    /// Builds a stored record from a create payload.
    ///
    /// Both timestamps are set to `now`.
    #[must_use]
    pub fn from_new(new: NewFir, report_id: String, now: DateTime<Utc>) -> Self {
        Self {
            report_id,
            date: new.date,
            time: new.time,
            fir_type: new.fir_type,
            location: new.location,
            complainant: new.complainant,
            status: new.status,
            priority: new.priority,
            officer: new.officer,
            description: new.description,
            evidence: new.evidence,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every field present in `patch` and bumps `updated_at`.
    pub fn apply_patch(&mut self, patch: &FirPatch, now: DateTime<Utc>) {
        if let Some(date) = &patch.date {
            self.date.clone_from(date);
        }
        if let Some(time) = &patch.time {
            self.time.clone_from(time);
        }
        if let Some(fir_type) = patch.fir_type {
            self.fir_type = fir_type;
        }
        if let Some(location) = &patch.location {
            self.location.clone_from(location);
        }
        if let Some(complainant) = &patch.complainant {
            self.complainant.clone_from(complainant);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(officer) = &patch.officer {
            self.officer.clone_from(officer);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(evidence) = &patch.evidence {
            self.evidence.clone_from(evidence);
        }
        if let Some(notes) = &patch.notes {
            self.notes.clone_from(notes);
        }
        self.updated_at = now;
    }
}

/// Payload for creating an FIR.
///
/// `report_id` is generated by the record layer when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFir {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub fir_type: FirType,
    pub location: String,
    pub complainant: String,
    #[serde(default)]
    pub status: FirStatus,
    #[serde(default)]
    pub priority: FirPriority,
    pub officer: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub evidence: String,
    #[serde(default)]
    pub notes: String,
}

impl NewFir {
    /// Returns the required free-text fields that are empty or whitespace.
    #[must_use]
    pub fn blank_required_fields(&self) -> Vec<FirField> {
        [
            (FirField::Date, &self.date),
            (FirField::Time, &self.time),
            (FirField::Location, &self.location),
            (FirField::Complainant, &self.complainant),
            (FirField::Officer, &self.officer),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// Partial update for an FIR. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirPatch {
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub fir_type: Option<FirType>,
    pub location: Option<String>,
    pub complainant: Option<String>,
    pub status: Option<FirStatus>,
    pub priority: Option<FirPriority>,
    pub officer: Option<String>,
    pub description: Option<String>,
    pub evidence: Option<String>,
    pub notes: Option<String>,
}

impl FirPatch {
    /// Returns the required free-text fields this patch would blank out.
    #[must_use]
    pub fn blank_required_fields(&self) -> Vec<FirField> {
        [
            (FirField::Date, &self.date),
            (FirField::Time, &self.time),
            (FirField::Location, &self.location),
            (FirField::Complainant, &self.complainant),
            (FirField::Officer, &self.officer),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_some_and(|v| v.trim().is_empty()))
        .map(|(field, _)| field)
        .collect()
    }
}

/// One parsed spreadsheet row: `(header, cell)` pairs in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow(Vec<(String, String)>);

impl RawRow {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Sets the cell under `header`.
    ///
    /// A header seen before keeps its column position and takes the new
    /// value, so with repeated headers the last column wins.
    pub fn push(&mut self, header: impl Into<String>, value: impl Into<String>) {
        let header = header.into();
        let value = value.into();
        match self.0.iter_mut().find(|(h, _)| *h == header) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((header, value)),
        }
    }

    /// Iterates `(header, cell)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (header, value) in iter {
            row.push(header, value);
        }
        row
    }
}

/// A spreadsheet row mapped onto canonical field names.
///
/// Values are kept exactly as they appeared in the file; validation decides
/// whether they are usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub fir_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complainant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub officer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NormalizedRecord {
    /// Returns the value stored for `field`.
    #[must_use]
    pub fn get(&self, field: FirField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Sets the value stored for `field`.
    pub fn set(&mut self, field: FirField, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }

    const fn slot(&self, field: FirField) -> &Option<String> {
        match field {
            FirField::Date => &self.date,
            FirField::Time => &self.time,
            FirField::Type => &self.fir_type,
            FirField::Location => &self.location,
            FirField::Complainant => &self.complainant,
            FirField::Status => &self.status,
            FirField::Priority => &self.priority,
            FirField::Officer => &self.officer,
            FirField::Description => &self.description,
            FirField::Evidence => &self.evidence,
            FirField::Notes => &self.notes,
        }
    }

    const fn slot_mut(&mut self, field: FirField) -> &mut Option<String> {
        match field {
            FirField::Date => &mut self.date,
            FirField::Time => &mut self.time,
            FirField::Type => &mut self.fir_type,
            FirField::Location => &mut self.location,
            FirField::Complainant => &mut self.complainant,
            FirField::Status => &mut self.status,
            FirField::Priority => &mut self.priority,
            FirField::Officer => &mut self.officer,
            FirField::Description => &mut self.description,
            FirField::Evidence => &mut self.evidence,
            FirField::Notes => &mut self.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;

    #[test]
    fn fir_type_parsing_is_exact() {
        assert_eq!(FirType::from_str("Theft").unwrap(), FirType::Theft);
        assert_eq!(
            FirType::from_str("Cyber Crime").unwrap(),
            FirType::CyberCrime
        );
        assert!(FirType::from_str("theft").is_err());
        assert!(FirType::from_str("CyberCrime").is_err());
        assert!(FirType::from_str("Cyber crime").is_err());
    }

    #[test]
    fn fir_type_display_matches_parse() {
        for t in FirType::all() {
            assert_eq!(FirType::from_str(&t.to_string()).unwrap(), *t);
        }
    }

    #[test]
    fn raw_row_repeated_header_takes_last_value() {
        let row: RawRow = [("location", "Andheri"), ("notes", "n"), ("location", "Bandra")]
            .into_iter()
            .collect();
        let cells: Vec<_> = row.iter().collect();
        assert_eq!(cells, vec![("location", "Bandra"), ("notes", "n")]);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn status_and_priority_use_lowercase_names() {
        assert_eq!(FirStatus::Investigating.as_ref(), "investigating");
        assert_eq!(FirPriority::High.to_string(), "high");
        assert_eq!(FirStatus::default(), FirStatus::Open);
        assert_eq!(FirPriority::default(), FirPriority::Medium);
    }

    #[test]
    fn canonical_header_is_first_synonym() {
        for field in FirField::all() {
            assert_eq!(field.synonyms()[0], field.label().to_lowercase());
        }
    }

    #[test]
    fn header_matching_ignores_case_and_padding() {
        assert!(FirField::Complainant.matches_header("  Complainant Name "));
        assert!(FirField::Notes.matches_header("REMARKS"));
        assert!(!FirField::Notes.matches_header("note"));
    }

    #[test]
    fn new_fir_defaults_optional_fields() {
        let new: NewFir = serde_json::from_str(
            r#"{"date":"2024-01-01","time":"10:00","type":"Cyber Crime",
                "location":"Powai","complainant":"A","officer":"SI B"}"#,
        )
        .unwrap();
        assert_eq!(new.fir_type, FirType::CyberCrime);
        assert_eq!(new.status, FirStatus::Open);
        assert_eq!(new.priority, FirPriority::Medium);
        assert!(new.report_id.is_none());
        assert!(new.notes.is_empty());
    }

    #[test]
    fn new_fir_rejects_unknown_type() {
        let result: Result<NewFir, _> = serde_json::from_str(
            r#"{"date":"2024-01-01","time":"10:00","type":"theft",
                "location":"Powai","complainant":"A","officer":"SI B"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let now = Utc::now();
        let new = NewFir {
            report_id: None,
            date: "2024-01-01".to_string(),
            time: "10:00".to_string(),
            fir_type: FirType::Fraud,
            location: "Powai".to_string(),
            complainant: "Amit".to_string(),
            status: FirStatus::Open,
            priority: FirPriority::Low,
            officer: "SI Kulkarni".to_string(),
            description: String::new(),
            evidence: String::new(),
            notes: String::new(),
        };
        let mut record = FirRecord::from_new(new, "FIR-2024-1".to_string(), now);
        let later = now + chrono::Duration::seconds(5);
        record.apply_patch(
            &FirPatch {
                status: Some(FirStatus::Closed),
                notes: Some("Arrested".to_string()),
                ..FirPatch::default()
            },
            later,
        );
        assert_eq!(record.status, FirStatus::Closed);
        assert_eq!(record.notes, "Arrested");
        assert_eq!(record.location, "Powai");
        assert_eq!(record.created_at, now);
        assert_eq!(record.updated_at, later);
    }

    #[test]
    fn patch_reports_blanked_required_fields() {
        let patch = FirPatch {
            officer: Some("  ".to_string()),
            notes: Some(String::new()),
            ..FirPatch::default()
        };
        assert_eq!(patch.blank_required_fields(), vec![FirField::Officer]);
    }

    #[test]
    fn normalized_record_get_set() {
        let mut record = NormalizedRecord::default();
        record.set(FirField::Type, "Theft");
        assert_eq!(record.get(FirField::Type), Some("Theft"));
        assert_eq!(record.fir_type.as_deref(), Some("Theft"));
        assert!(record.get(FirField::Date).is_none());
    }
}
