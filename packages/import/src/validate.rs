//! Per-row validation of normalized FIR records.
//!
//! Every rule is checked for every row so that a single pass reports all of
//! a row's problems. Enumerated values are never coerced: an unknown crime
//! type is rejected rather than mapped to `Other`.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use safecity_fir_models::{FirField, FirPriority, FirStatus, FirType, NewFir, NormalizedRecord, RawRow};
use serde::{Serialize, Serializer};

use crate::normalize::normalize;

/// `HH:MM` or `HH:MM:SS`, 24-hour clock.
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9](:[0-5][0-9])?$").unwrap_or_else(|_| unreachable!())
});

/// Date-only layouts accepted for the `date` field.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Date-time layouts accepted for the `date` field.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Shortest accepted date text; rejects truncated values like `2024-1`.
const MIN_DATE_LEN: usize = 8;

/// A single rule violation, attributed to the field it concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{} is required", .0.label())]
    Required(FirField),
    #[error("Invalid date format (use YYYY-MM-DD)")]
    InvalidDate,
    #[error("Invalid time format (use HH:MM or HH:MM:SS)")]
    InvalidTime,
    #[error(
        "Invalid type. Must be one of: Theft, Assault, Robbery, Fraud, Cyber Crime, Vandalism, Other"
    )]
    InvalidType,
    #[error("Invalid status. Must be: open, investigating, or closed")]
    InvalidStatus,
    #[error("Invalid priority. Must be: low, medium, or high")]
    InvalidPriority,
}

impl ValidationError {
    /// The field this violation concerns.
    #[must_use]
    pub const fn field(self) -> FirField {
        match self {
            Self::Required(field) => field,
            Self::InvalidDate => FirField::Date,
            Self::InvalidTime => FirField::Time,
            Self::InvalidType => FirField::Type,
            Self::InvalidStatus => FirField::Status,
            Self::InvalidPriority => FirField::Priority,
        }
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A row that passed validation, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidRecord {
    /// Row number in the original file (header is row 1).
    pub row: usize,
    pub record: NewFir,
}

/// A row that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// Row number in the original file (header is row 1).
    pub row: usize,
    pub record: NormalizedRecord,
    pub errors: Vec<ValidationError>,
}

/// Valid/invalid partition of a parsed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid_records: Vec<ValidRecord>,
    pub errors: Vec<RowError>,
    pub total_records: usize,
}

impl ValidationReport {
    #[must_use]
    pub const fn valid_count(&self) -> usize {
        self.valid_records.len()
    }

    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Validates one normalized record.
///
/// On success returns the cleaned create payload: type, location,
/// complainant, and officer trimmed; status and priority trimmed and
/// lower-cased; everything else unchanged.
///
/// # Errors
///
/// Returns every [`ValidationError`] the record violates, in rule order.
pub fn validate(record: &NormalizedRecord) -> Result<NewFir, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let date = required(record, FirField::Date, &mut errors);
    if let Some(date) = date
        && !is_valid_date(date)
    {
        errors.push(ValidationError::InvalidDate);
    }

    let time = required(record, FirField::Time, &mut errors);
    if let Some(time) = time
        && !TIME_RE.is_match(time.trim())
    {
        errors.push(ValidationError::InvalidTime);
    }

    let fir_type = required(record, FirField::Type, &mut errors).and_then(|t| {
        let parsed = t.trim().parse::<FirType>().ok();
        if parsed.is_none() {
            errors.push(ValidationError::InvalidType);
        }
        parsed
    });

    let location = required(record, FirField::Location, &mut errors);
    let complainant = required(record, FirField::Complainant, &mut errors);
    let officer = required(record, FirField::Officer, &mut errors);

    let status = match record.status.as_deref() {
        Some(s) if !s.is_empty() => {
            let parsed = s.trim().to_lowercase().parse::<FirStatus>().ok();
            if parsed.is_none() {
                errors.push(ValidationError::InvalidStatus);
            }
            parsed
        }
        _ => Some(FirStatus::default()),
    };

    let priority = match record.priority.as_deref() {
        Some(p) if !p.is_empty() => {
            let parsed = p.trim().to_lowercase().parse::<FirPriority>().ok();
            if parsed.is_none() {
                errors.push(ValidationError::InvalidPriority);
            }
            parsed
        }
        _ => Some(FirPriority::default()),
    };

    let (
        true,
        Some(date),
        Some(time),
        Some(fir_type),
        Some(location),
        Some(complainant),
        Some(officer),
        Some(status),
        Some(priority),
    ) = (
        errors.is_empty(),
        date,
        time,
        fir_type,
        location,
        complainant,
        officer,
        status,
        priority,
    )
    else {
        return Err(errors);
    };

    Ok(NewFir {
        report_id: None,
        date: date.to_string(),
        time: time.to_string(),
        fir_type,
        location: location.trim().to_string(),
        complainant: complainant.trim().to_string(),
        status,
        priority,
        officer: officer.trim().to_string(),
        description: record.description.clone().unwrap_or_default(),
        evidence: record.evidence.clone().unwrap_or_default(),
        notes: record.notes.clone().unwrap_or_default(),
    })
}

/// Normalizes and validates a parsed batch.
///
/// Row numbers count the header as row 1, so the first data row is row 2.
#[must_use]
pub fn validate_rows(rows: &[RawRow]) -> ValidationReport {
    let mut report = ValidationReport {
        total_records: rows.len(),
        ..ValidationReport::default()
    };

    for (index, raw) in rows.iter().enumerate() {
        let row = index + 2;
        let record = normalize(raw);
        match validate(&record) {
            Ok(record) => report.valid_records.push(ValidRecord { row, record }),
            Err(errors) => report.errors.push(RowError {
                row,
                record,
                errors,
            }),
        }
    }

    log::info!(
        "Validated {} rows: {} valid, {} with errors",
        report.total_records,
        report.valid_count(),
        report.error_count(),
    );

    report
}

/// Returns the field's value if it is present and not blank, recording a
/// [`ValidationError::Required`] otherwise.
fn required<'a>(
    record: &'a NormalizedRecord,
    field: FirField,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a str> {
    match record.get(field) {
        Some(value) if !value.trim().is_empty() => Some(value),
        _ => {
            errors.push(ValidationError::Required(field));
            None
        }
    }
}

/// Returns `true` if `value` is a plausible calendar date.
fn is_valid_date(value: &str) -> bool {
    let value = value.trim();
    if value.len() < MIN_DATE_LEN {
        return false;
    }

    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
        || DATE_TIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
        || DateTime::parse_from_rfc3339(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_record() -> NormalizedRecord {
        let row: RawRow = [
            ("date", "2024-01-01"),
            ("time", "10:00"),
            ("type", "Theft"),
            ("location", "X"),
            ("complainant", "Y"),
            ("officer", "Z"),
        ]
        .into_iter()
        .collect();
        normalize(&row)
    }

    #[test]
    fn accepts_a_complete_record() {
        let new = validate(&valid_record()).unwrap();
        assert_eq!(new.fir_type, FirType::Theft);
        assert_eq!(new.status, FirStatus::Open);
        assert_eq!(new.priority, FirPriority::Medium);
        assert!(new.report_id.is_none());
    }

    #[test]
    fn reports_one_error_per_missing_required_field() {
        let required = [
            FirField::Date,
            FirField::Time,
            FirField::Type,
            FirField::Location,
            FirField::Complainant,
            FirField::Officer,
        ];
        for field in required {
            let mut record = valid_record();
            record.set(field, "   ");
            let errors = validate(&record).unwrap_err();
            assert_eq!(errors, vec![ValidationError::Required(field)], "{field:?}");
        }

        let errors = validate(&normalize(&RawRow::new())).unwrap_err();
        assert_eq!(errors.len(), required.len());
        assert_eq!(errors[0].to_string(), "Date is required");
        assert_eq!(errors[5].to_string(), "Officer is required");
    }

    #[test]
    fn type_must_match_exactly() {
        for variant in ["theft", "THEFT", "Thief", "Cyber crime", "CyberCrime"] {
            let mut record = valid_record();
            record.set(FirField::Type, variant);
            assert_eq!(
                validate(&record).unwrap_err(),
                vec![ValidationError::InvalidType],
                "{variant}"
            );
        }

        let mut record = valid_record();
        record.set(FirField::Type, "  Cyber Crime ");
        assert_eq!(validate(&record).unwrap().fir_type, FirType::CyberCrime);
    }

    #[test]
    fn time_pattern_bounds() {
        for ok in ["00:00", "23:59", "09:05:59", " 10:00 "] {
            let mut record = valid_record();
            record.set(FirField::Time, ok);
            assert!(validate(&record).is_ok(), "{ok}");
        }
        for bad in ["24:00", "25:99", "9:00", "12:60", "12:00:60", "12-00"] {
            let mut record = valid_record();
            record.set(FirField::Time, bad);
            assert_eq!(
                validate(&record).unwrap_err(),
                vec![ValidationError::InvalidTime],
                "{bad}"
            );
        }
    }

    #[test]
    fn date_shapes() {
        for ok in [
            "2024-01-01",
            "2024/01/31",
            "01/31/2024",
            "January 5, 2024",
            "5 Jan 2024",
            "2024-01-01T10:00:00",
            "2024-01-01T10:00:00Z",
        ] {
            let mut record = valid_record();
            record.set(FirField::Date, ok);
            assert!(validate(&record).is_ok(), "{ok}");
        }
        for bad in ["2024-1", "2024-02-30", "yesterday", "13/45/2024"] {
            let mut record = valid_record();
            record.set(FirField::Date, bad);
            assert_eq!(
                validate(&record).unwrap_err(),
                vec![ValidationError::InvalidDate],
                "{bad}"
            );
        }
    }

    #[test]
    fn status_and_priority_are_case_insensitive_and_cleaned() {
        let mut record = valid_record();
        record.set(FirField::Status, " Investigating ");
        record.set(FirField::Priority, "HIGH");
        let new = validate(&record).unwrap();
        assert_eq!(new.status, FirStatus::Investigating);
        assert_eq!(new.priority, FirPriority::High);

        record.set(FirField::Status, "pending");
        record.set(FirField::Priority, "urgent");
        assert_eq!(
            validate(&record).unwrap_err(),
            vec![ValidationError::InvalidStatus, ValidationError::InvalidPriority]
        );
    }

    #[test]
    fn collects_all_errors_in_rule_order() {
        let row: RawRow = [
            ("date", "soon"),
            ("time", "25:99"),
            ("type", "theft"),
            ("status", "unknown"),
        ]
        .into_iter()
        .collect();
        let errors = validate(&normalize(&row)).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidDate,
                ValidationError::InvalidTime,
                ValidationError::InvalidType,
                ValidationError::Required(FirField::Location),
                ValidationError::Required(FirField::Complainant),
                ValidationError::Required(FirField::Officer),
                ValidationError::InvalidStatus,
            ]
        );
        assert_eq!(errors[6].field(), FirField::Status);
    }

    #[test]
    fn validation_is_idempotent() {
        let mut record = valid_record();
        record.set(FirField::Time, "7pm");
        record.set(FirField::Officer, "");
        assert_eq!(validate(&record), validate(&record));
        assert_eq!(validate(&valid_record()), validate(&valid_record()));
    }

    #[test]
    fn cleans_trimmed_fields_only() {
        let row: RawRow = [
            ("date", "2024-01-01"),
            ("time", "10:00"),
            ("type", " Fraud "),
            ("location", " Powai "),
            ("complainant", " Amit "),
            ("officer", " SI Kulkarni "),
            ("notes", " keep spacing "),
        ]
        .into_iter()
        .collect();
        let new = validate(&normalize(&row)).unwrap();
        assert_eq!(new.location, "Powai");
        assert_eq!(new.complainant, "Amit");
        assert_eq!(new.officer, "SI Kulkarni");
        assert_eq!(new.notes, " keep spacing ");
    }

    #[test]
    fn two_row_batch_scenario() {
        let rows: Vec<RawRow> = vec![
            [
                ("date", "2024-01-01"),
                ("time", "10:00"),
                ("type", "Theft"),
                ("location", "X"),
                ("complainant", "Y"),
                ("officer", "Z"),
            ]
            .into_iter()
            .collect(),
            [
                ("date", "2024-01-01"),
                ("time", "25:99"),
                ("type", "Theft"),
                ("location", "X"),
                ("complainant", "Y"),
                ("officer", "Z"),
            ]
            .into_iter()
            .collect(),
        ];

        let report = validate_rows(&rows);
        assert_eq!(report.total_records, 2);
        assert_eq!(report.valid_count(), 1);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.valid_records[0].row, 2);
        assert_eq!(report.errors[0].row, 3);
        assert!(
            report.errors[0].errors[0]
                .to_string()
                .contains("Invalid time format")
        );
    }
}
