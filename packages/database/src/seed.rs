//! Sample FIR data for demos and local development.

use chrono::{DateTime, Utc};
use safecity_fir_models::{FirPriority, FirRecord, FirStatus, FirType, NewFir};

use crate::{RecordStore, StoreError};

#[allow(clippy::too_many_arguments)]
fn sample(
    report_id: &str,
    date: &str,
    time: &str,
    fir_type: FirType,
    location: &str,
    complainant: &str,
    status: FirStatus,
    priority: FirPriority,
    officer: &str,
    description: &str,
    evidence: &str,
    notes: &str,
) -> NewFir {
    NewFir {
        report_id: Some(report_id.to_string()),
        date: date.to_string(),
        time: time.to_string(),
        fir_type,
        location: location.to_string(),
        complainant: complainant.to_string(),
        status,
        priority,
        officer: officer.to_string(),
        description: description.to_string(),
        evidence: evidence.to_string(),
        notes: notes.to_string(),
    }
}

/// Returns the sample FIRs, newest report first.
#[must_use]
pub fn sample_records() -> Vec<NewFir> {
    vec![
        sample(
            "FIR-2024-1847",
            "2024-01-27",
            "14:32",
            FirType::Theft,
            "Andheri West",
            "Rajesh Kumar",
            FirStatus::Open,
            FirPriority::High,
            "SI Patil",
            "Wallet stolen from shop",
            "CCTV footage available",
            "Suspect identified",
        ),
        sample(
            "FIR-2024-1846",
            "2024-01-27",
            "12:15",
            FirType::Assault,
            "Bandra",
            "Priya Sharma",
            FirStatus::Investigating,
            FirPriority::High,
            "SI Deshmukh",
            "Street fight incident",
            "Eyewitness accounts",
            "Medical report filed",
        ),
        sample(
            "FIR-2024-1845",
            "2024-01-27",
            "10:45",
            FirType::Fraud,
            "Powai",
            "Amit Verma",
            FirStatus::Open,
            FirPriority::Medium,
            "SI Kulkarni",
            "Online transaction fraud",
            "Bank statements, screenshots",
            "Cyber crime unit notified",
        ),
        sample(
            "FIR-2024-1844",
            "2024-01-26",
            "22:30",
            FirType::Robbery,
            "Kurla",
            "Sunita Patel",
            FirStatus::Closed,
            FirPriority::High,
            "SI Jadhav",
            "Home robbery",
            "Items recovered",
            "Case closed - arrested",
        ),
        sample(
            "FIR-2024-1843",
            "2024-01-26",
            "18:20",
            FirType::Vandalism,
            "Dadar",
            "Mohammed Ali",
            FirStatus::Investigating,
            FirPriority::Low,
            "SI Patil",
            "Property damage",
            "Photos taken",
            "Local youth identified",
        ),
    ]
}

/// Clears the store and inserts [`sample_records`].
///
/// Records are inserted oldest report first so that newest-first listings
/// show them in report order.
///
/// # Errors
///
/// Returns [`StoreError`] if clearing or any insert fails.
pub async fn seed_store(
    store: &dyn RecordStore,
    now: DateTime<Utc>,
) -> Result<Vec<FirRecord>, StoreError> {
    let cleared = store.clear().await?;
    log::info!("Cleared {cleared} existing FIRs");

    let mut created = Vec::new();
    for mut new in sample_records().into_iter().rev() {
        let report_id = new.report_id.take().unwrap_or_default();
        let record = store
            .create(FirRecord::from_new(new, report_id, now))
            .await?;
        created.push(record);
    }

    log::info!("Seeded {} sample FIRs", created.len());
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::queries::query_records;
    use safecity_database_models::{RecordFilter, RecordQuery};

    #[tokio::test]
    async fn seeding_replaces_existing_records() {
        let store = MemoryStore::new();
        let now = Utc::now();
        seed_store(&store, now).await.unwrap();
        let created = seed_store(&store, now).await.unwrap();
        assert_eq!(created.len(), 5);

        let page = query_records(&store, &RecordQuery::new(None, None, RecordFilter::default()))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.records[0].report_id, "FIR-2024-1847");
        assert_eq!(page.records[4].report_id, "FIR-2024-1843");
    }

    #[test]
    fn samples_have_no_blank_required_fields() {
        for new in sample_records() {
            assert!(new.blank_required_fields().is_empty());
        }
    }
}
