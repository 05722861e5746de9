//! Record listings and single-record operations.
//!
//! These functions are written against [`RecordStore`] so the same listing
//! and identifier-generation rules apply to every store binding.

use chrono::{DateTime, Datelike as _, Utc};
use safecity_database_models::{Pagination, RecordFilter, RecordPage, RecordQuery, SortOrder};
use safecity_fir_models::{FirPatch, FirRecord, NewFir};

use crate::{RecordStore, StoreError};

/// Runs a paginated listing: counts every match, then fetches the
/// requested page newest-first.
///
/// A page past the end returns no records with the total unchanged.
///
/// # Errors
///
/// Returns [`StoreError`] if either store call fails.
pub async fn query_records(
    store: &dyn RecordStore,
    query: &RecordQuery,
) -> Result<RecordPage, StoreError> {
    let total = store.count(&query.filter).await?;
    let records = store
        .find(
            &query.filter,
            SortOrder::NewestFirst,
            query.skip(),
            query.limit,
        )
        .await?;

    log::debug!(
        "Listed {} of {total} FIRs (page {}, limit {})",
        records.len(),
        query.page,
        query.limit,
    );

    Ok(RecordPage {
        records,
        pagination: Pagination::new(total, query.page, query.limit),
    })
}

/// Returns every record matching `filter`, newest first.
///
/// # Errors
///
/// Returns [`StoreError`] if either store call fails.
pub async fn export_records(
    store: &dyn RecordStore,
    filter: &RecordFilter,
) -> Result<Vec<FirRecord>, StoreError> {
    let total = store.count(filter).await?;
    store.find(filter, SortOrder::NewestFirst, 0, total).await
}

/// Builds the report ID given to the `(existing + 1)`th record of `year`.
#[must_use]
pub fn report_id_for(year: i32, existing: u64) -> String {
    format!("FIR-{year}-{}", existing + 1)
}

/// Creates a record, generating its report ID when none is supplied.
///
/// Generated IDs are `FIR-<year of now>-<total records + 1>`. A generated
/// ID that collides with an existing record is rejected by the store like
/// any other duplicate.
///
/// # Errors
///
/// * [`StoreError::Invalid`] if a required field is blank
/// * [`StoreError::DuplicateReportId`] if the report ID is taken
/// * any other [`StoreError`] from the store
pub async fn create_record(
    store: &dyn RecordStore,
    mut new: NewFir,
    now: DateTime<Utc>,
) -> Result<FirRecord, StoreError> {
    let blank = new.blank_required_fields();
    if !blank.is_empty() {
        let labels: Vec<&str> = blank.iter().map(|f| f.label()).collect();
        return Err(StoreError::Invalid {
            message: format!("Missing required fields: {}", labels.join(", ")),
        });
    }

    let report_id = match new.report_id.take().filter(|id| !id.trim().is_empty()) {
        Some(id) => id,
        None => {
            let existing = store.count(&RecordFilter::default()).await?;
            report_id_for(now.year(), existing)
        }
    };

    let record = store
        .create(FirRecord::from_new(new, report_id, now))
        .await?;
    log::info!("Created FIR {}", record.report_id);
    Ok(record)
}

/// Fetches one record by report ID.
///
/// # Errors
///
/// Returns [`StoreError`] if the store call fails.
pub async fn get_record(
    store: &dyn RecordStore,
    report_id: &str,
) -> Result<Option<FirRecord>, StoreError> {
    store.get(report_id).await
}

/// Applies a partial update, returning `None` if the record does not exist.
///
/// # Errors
///
/// * [`StoreError::Invalid`] if the patch blanks a required field
/// * any other [`StoreError`] from the store
pub async fn update_record(
    store: &dyn RecordStore,
    report_id: &str,
    patch: &FirPatch,
    now: DateTime<Utc>,
) -> Result<Option<FirRecord>, StoreError> {
    let blank = patch.blank_required_fields();
    if !blank.is_empty() {
        let labels: Vec<&str> = blank.iter().map(|f| f.label()).collect();
        return Err(StoreError::Invalid {
            message: format!("Required fields cannot be blank: {}", labels.join(", ")),
        });
    }

    let updated = store.update(report_id, patch, now).await?;
    if updated.is_some() {
        log::info!("Updated FIR {report_id}");
    }
    Ok(updated)
}

/// Deletes one record, returning `None` if it does not exist.
///
/// # Errors
///
/// Returns [`StoreError`] if the store call fails.
pub async fn delete_record(
    store: &dyn RecordStore,
    report_id: &str,
) -> Result<Option<FirRecord>, StoreError> {
    let deleted = store.delete(report_id).await?;
    if deleted.is_some() {
        log::info!("Deleted FIR {report_id}");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use safecity_fir_models::{FirPriority, FirStatus, FirType};

    fn new_fir(location: &str, status: FirStatus, fir_type: FirType) -> NewFir {
        NewFir {
            report_id: None,
            date: "2024-01-27".to_string(),
            time: "10:45".to_string(),
            fir_type,
            location: location.to_string(),
            complainant: "Amit Verma".to_string(),
            status,
            priority: FirPriority::Medium,
            officer: "SI Kulkarni".to_string(),
            description: String::new(),
            evidence: String::new(),
            notes: String::new(),
        }
    }

    fn at(year: i32, seconds: u32) -> DateTime<Utc> {
        chrono::NaiveDate::from_ymd_opt(year, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, seconds)
            .unwrap()
            .and_utc()
    }

    #[tokio::test]
    async fn generates_sequential_report_id_from_count() {
        let store = MemoryStore::new();
        for i in 0..5 {
            create_record(&store, new_fir("Powai", FirStatus::Open, FirType::Fraud), at(2024, i))
                .await
                .unwrap();
        }
        let created = create_record(
            &store,
            new_fir("Powai", FirStatus::Open, FirType::Fraud),
            at(2024, 10),
        )
        .await
        .unwrap();
        assert_eq!(created.report_id, "FIR-2024-6");
    }

    #[tokio::test]
    async fn keeps_supplied_report_id() {
        let store = MemoryStore::new();
        let mut new = new_fir("Kurla", FirStatus::Closed, FirType::Robbery);
        new.report_id = Some("FIR-2024-1844".to_string());
        let created = create_record(&store, new, at(2025, 0)).await.unwrap();
        assert_eq!(created.report_id, "FIR-2024-1844");
    }

    #[tokio::test]
    async fn blank_required_field_is_rejected() {
        let store = MemoryStore::new();
        let new = new_fir("   ", FirStatus::Open, FirType::Theft);
        let err = create_record(&store, new, at(2024, 0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid { message } if message.contains("Location")));
        assert_eq!(store.count(&RecordFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn generated_id_collision_is_a_duplicate() {
        let store = MemoryStore::new();
        let mut new = new_fir("Bandra", FirStatus::Open, FirType::Assault);
        new.report_id = Some("FIR-2024-1".to_string());
        create_record(&store, new, at(2024, 0)).await.unwrap();

        let err = create_record(
            &store,
            new_fir("Bandra", FirStatus::Open, FirType::Assault),
            at(2024, 1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateReportId(_)));
    }

    #[tokio::test]
    async fn pagination_past_end_keeps_total() {
        let store = MemoryStore::new();
        for i in 0..10 {
            create_record(&store, new_fir("Dadar", FirStatus::Open, FirType::Theft), at(2024, i))
                .await
                .unwrap();
        }

        let page = query_records(&store, &RecordQuery::new(Some(2), Some(4), RecordFilter::default()))
            .await
            .unwrap();
        assert_eq!(page.records.len(), 4);
        assert_eq!(page.pagination, Pagination::new(10, 2, 4));
        assert_eq!(page.pagination.pages, 3);
        assert_eq!(page.records[0].report_id, "FIR-2024-6");

        let beyond = query_records(&store, &RecordQuery::new(Some(4), Some(4), RecordFilter::default()))
            .await
            .unwrap();
        assert!(beyond.records.is_empty());
        assert_eq!(beyond.pagination.total, 10);
    }

    #[tokio::test]
    async fn listing_applies_filter_composition() {
        let store = MemoryStore::new();
        let combos = [
            (FirStatus::Open, FirType::Theft),
            (FirStatus::Open, FirType::Fraud),
            (FirStatus::Closed, FirType::Theft),
            (FirStatus::Open, FirType::Theft),
        ];
        for (i, (status, fir_type)) in combos.into_iter().enumerate() {
            let secs = u32::try_from(i).unwrap();
            create_record(&store, new_fir("Kurla", status, fir_type), at(2024, secs))
                .await
                .unwrap();
        }

        let filter = RecordFilter::from_params(None, Some("open"), Some("Theft"), None);
        let page = query_records(&store, &RecordQuery::new(None, None, filter))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 2);
        assert!(
            page.records
                .iter()
                .all(|r| r.status == FirStatus::Open && r.fir_type == FirType::Theft)
        );
    }

    #[tokio::test]
    async fn update_and_delete_missing_return_none() {
        let store = MemoryStore::new();
        let patch = FirPatch {
            notes: Some("follow up".to_string()),
            ..FirPatch::default()
        };
        assert!(
            update_record(&store, "FIR-2024-99", &patch, at(2024, 0))
                .await
                .unwrap()
                .is_none()
        );
        assert!(delete_record(&store, "FIR-2024-99").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn export_returns_every_match_newest_first() {
        let store = MemoryStore::new();
        for i in 0..12 {
            create_record(&store, new_fir("Dadar", FirStatus::Open, FirType::Other), at(2024, i))
                .await
                .unwrap();
        }
        let all = export_records(&store, &RecordFilter::default()).await.unwrap();
        assert_eq!(all.len(), 12);
        assert_eq!(all[0].report_id, "FIR-2024-12");
        assert_eq!(all[11].report_id, "FIR-2024-1");
    }
}
