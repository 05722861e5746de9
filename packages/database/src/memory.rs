//! In-process FIR record store.
//!
//! Used for tests and ephemeral server runs (`SAFECITY_DB_PATH=:memory:`).
//! Filtering goes through [`RecordFilter::matches`], so this store is also
//! the reference for what the `DuckDB` binding must return.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safecity_database_models::{RecordFilter, SortOrder};
use safecity_fir_models::{FirPatch, FirRecord};

use crate::{RecordStore, StoreError};

struct Entry {
    seq: u64,
    record: FirRecord,
}

#[derive(Default)]
struct Inner {
    next_seq: u64,
    entries: Vec<Entry>,
}

/// FIR record store held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find(
        &self,
        filter: &RecordFilter,
        sort: SortOrder,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<FirRecord>, StoreError> {
        let inner = self.lock()?;
        let mut matching: Vec<&Entry> = inner
            .entries
            .iter()
            .filter(|e| filter.matches(&e.record))
            .collect();

        matching.sort_by(|a, b| {
            let key_a = (a.record.created_at, a.seq);
            let key_b = (b.record.created_at, b.seq);
            match sort {
                SortOrder::NewestFirst => key_b.cmp(&key_a),
                SortOrder::OldestFirst => key_a.cmp(&key_b),
            }
        });

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(matching
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|e| e.record.clone())
            .collect())
    }

    async fn count(&self, filter: &RecordFilter) -> Result<u64, StoreError> {
        let inner = self.lock()?;
        let count = inner
            .entries
            .iter()
            .filter(|e| filter.matches(&e.record))
            .count();
        Ok(count as u64)
    }

    async fn get(&self, report_id: &str) -> Result<Option<FirRecord>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .entries
            .iter()
            .find(|e| e.record.report_id == report_id)
            .map(|e| e.record.clone()))
    }

    async fn create(&self, record: FirRecord) -> Result<FirRecord, StoreError> {
        let mut inner = self.lock()?;
        if inner
            .entries
            .iter()
            .any(|e| e.record.report_id == record.report_id)
        {
            return Err(StoreError::DuplicateReportId(record.report_id));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.push(Entry {
            seq,
            record: record.clone(),
        });
        Ok(record)
    }

    async fn update(
        &self,
        report_id: &str,
        patch: &FirPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<FirRecord>, StoreError> {
        let mut inner = self.lock()?;
        Ok(inner
            .entries
            .iter_mut()
            .find(|e| e.record.report_id == report_id)
            .map(|e| {
                e.record.apply_patch(patch, now);
                e.record.clone()
            }))
    }

    async fn delete(&self, report_id: &str) -> Result<Option<FirRecord>, StoreError> {
        let mut inner = self.lock()?;
        let Some(idx) = inner
            .entries
            .iter()
            .position(|e| e.record.report_id == report_id)
        else {
            return Ok(None);
        };
        Ok(Some(inner.entries.remove(idx).record))
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let mut inner = self.lock()?;
        let removed = inner.entries.len() as u64;
        inner.entries.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safecity_fir_models::{FirPriority, FirStatus, FirType};

    fn record(report_id: &str, seconds: i64) -> FirRecord {
        let ts = DateTime::from_timestamp(1_706_000_000 + seconds, 0).unwrap();
        FirRecord {
            report_id: report_id.to_string(),
            date: "2024-01-26".to_string(),
            time: "18:20".to_string(),
            fir_type: FirType::Vandalism,
            location: "Dadar".to_string(),
            complainant: "Mohammed Ali".to_string(),
            status: FirStatus::Investigating,
            priority: FirPriority::Low,
            officer: "SI Patil".to_string(),
            description: String::new(),
            evidence: String::new(),
            notes: String::new(),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[tokio::test]
    async fn rejects_duplicates_without_overwriting() {
        let store = MemoryStore::new();
        store.create(record("FIR-1", 0)).await.unwrap();
        let mut dup = record("FIR-1", 1);
        dup.officer = "SI Jadhav".to_string();
        assert!(matches!(
            store.create(dup).await,
            Err(StoreError::DuplicateReportId(_))
        ));
        assert_eq!(
            store.get("FIR-1").await.unwrap().unwrap().officer,
            "SI Patil"
        );
    }

    #[tokio::test]
    async fn find_sorts_and_windows() {
        let store = MemoryStore::new();
        for (id, secs) in [("A", 0), ("B", 30), ("C", 30), ("D", 10)] {
            store.create(record(id, secs)).await.unwrap();
        }
        let ids = |records: Vec<FirRecord>| {
            records
                .into_iter()
                .map(|r| r.report_id)
                .collect::<Vec<_>>()
        };

        let all = RecordFilter::default();
        assert_eq!(
            ids(store.find(&all, SortOrder::NewestFirst, 0, 10).await.unwrap()),
            ["C", "B", "D", "A"]
        );
        assert_eq!(
            ids(store.find(&all, SortOrder::OldestFirst, 0, 2).await.unwrap()),
            ["A", "D"]
        );
        assert!(
            store
                .find(&all, SortOrder::NewestFirst, 10, 5)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn delete_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.delete("FIR-404").await.unwrap().is_none());
        store.create(record("FIR-1", 0)).await.unwrap();
        assert!(store.delete("FIR-1").await.unwrap().is_some());
        assert_eq!(store.clear().await.unwrap(), 0);
    }
}
