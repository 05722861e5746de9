//! Column-name normalization for imported rows.
//!
//! Spreadsheets arrive with whatever headers the author chose ("FIR Date",
//! "Reporter", "Remarks", ...). Each canonical [`FirField`] accepts a fixed
//! list of header synonyms; the first column whose header matches supplies
//! the field's value.

use safecity_fir_models::{FirField, NormalizedRecord, RawRow};

/// Defaults applied to optional fields that are absent or empty.
const DEFAULTS: &[(FirField, &str)] = &[
    (FirField::Status, "open"),
    (FirField::Priority, "medium"),
    (FirField::Description, ""),
    (FirField::Evidence, ""),
    (FirField::Notes, ""),
];

/// Maps a raw row onto canonical FIR field names.
///
/// Headers are compared case-insensitively after trimming; values are kept
/// verbatim. Required fields without a matching column stay `None`.
#[must_use]
pub fn normalize(row: &RawRow) -> NormalizedRecord {
    let mut record = NormalizedRecord::default();

    for field in FirField::all() {
        if let Some((_, value)) = row.iter().find(|(header, _)| field.matches_header(header)) {
            record.set(*field, value);
        }
    }

    for (field, default) in DEFAULTS {
        if record.get(*field).is_none_or(str::is_empty) {
            record.set(*field, *default);
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_row() -> RawRow {
        [
            ("Date", "2024-01-01"),
            ("Time", "10:00"),
            ("Type", "Theft"),
            ("Location", "X"),
            ("Complainant", "Y"),
            ("Officer", "Z"),
            ("Status", "closed"),
            ("Priority", "high"),
            ("Description", "d"),
            ("Evidence", "e"),
            ("Notes", "n"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn maps_canonical_headers() {
        let record = normalize(&canonical_row());
        assert_eq!(record.date.as_deref(), Some("2024-01-01"));
        assert_eq!(record.fir_type.as_deref(), Some("Theft"));
        assert_eq!(record.officer.as_deref(), Some("Z"));
        assert_eq!(record.status.as_deref(), Some("closed"));
        assert_eq!(record.notes.as_deref(), Some("n"));
    }

    #[test]
    fn every_synonym_normalizes_like_the_canonical_header() {
        let expected = normalize(&canonical_row());

        for field in FirField::all() {
            for synonym in field.synonyms() {
                let row: RawRow = canonical_row()
                    .iter()
                    .map(|(header, value)| {
                        if field.matches_header(header) {
                            (synonym.to_uppercase(), value.to_string())
                        } else {
                            (header.to_string(), value.to_string())
                        }
                    })
                    .collect();
                assert_eq!(normalize(&row), expected, "synonym {synonym:?}");
            }
        }
    }

    #[test]
    fn header_whitespace_and_case_are_ignored() {
        let row: RawRow = [("  INCIDENT LOCATION ", "Bandra")].into_iter().collect();
        assert_eq!(normalize(&row).location.as_deref(), Some("Bandra"));
    }

    #[test]
    fn first_matching_column_wins() {
        let row: RawRow = [("Reporter", "First"), ("Complainant", "Second")]
            .into_iter()
            .collect();
        assert_eq!(normalize(&row).complainant.as_deref(), Some("First"));
    }

    #[test]
    fn applies_defaults_only_to_optional_fields() {
        let row: RawRow = [("Status", ""), ("Unrelated", "value")].into_iter().collect();
        let record = normalize(&row);
        assert_eq!(record.status.as_deref(), Some("open"));
        assert_eq!(record.priority.as_deref(), Some("medium"));
        assert_eq!(record.description.as_deref(), Some(""));
        assert_eq!(record.evidence.as_deref(), Some(""));
        assert_eq!(record.notes.as_deref(), Some(""));
        assert!(record.date.is_none());
        assert!(record.fir_type.is_none());
        assert!(record.officer.is_none());
    }

    #[test]
    fn values_are_not_trimmed() {
        let row: RawRow = [("Type", "  Theft "), ("Priority", " HIGH")].into_iter().collect();
        let record = normalize(&row);
        assert_eq!(record.fir_type.as_deref(), Some("  Theft "));
        assert_eq!(record.priority.as_deref(), Some(" HIGH"));
    }
}
