//! `DuckDB`-backed FIR record store.
//!
//! All records live in a single `firs` table keyed by `report_id`. An
//! insertion sequence column breaks `created_at` ties so listings are
//! deterministic. `duckdb::Connection` is `Send` but not `Sync`, so the
//! connection is wrapped in a `Mutex`. Every operation takes the lock on
//! tokio's blocking pool so queries never stall async workers.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound as _, Utc};
use duckdb::Connection;
use safecity_database_models::{FieldFilter, RecordFilter, SortOrder};
use safecity_fir_models::{FirPatch, FirRecord};

use crate::{RecordStore, StoreError};

/// Column list shared by every `SELECT`, in [`FirRow`] order.
const FIR_COLUMNS: &str = "report_id, date, time, fir_type, location, complainant, status, \
                           priority, officer, description, evidence, notes, created_at, updated_at";

/// Timestamp format stored in the `created_at`/`updated_at` columns.
///
/// Fixed-width microsecond precision keeps lexicographic order equal to
/// chronological order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// FIR record store persisted in a `DuckDB` database.
pub struct DuckDbStore {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbStore {
    /// Opens (or creates) a record store at `path` and ensures the schema
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory, connection, or schema
    /// creation fails.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            crate::paths::ensure_dir(parent)?;
        }

        log::info!("Opening FIR store at {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens a store that lives only as long as this value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the connection or schema creation fails.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        create_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `op` against the connection on tokio's blocking pool.
    async fn run_blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| {
                StoreError::Unavailable("DuckDB connection mutex poisoned".to_string())
            })?;
            op(&*guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("DuckDB task failed: {e}")))?
    }
}

#[async_trait]
impl RecordStore for DuckDbStore {
    async fn find(
        &self,
        filter: &RecordFilter,
        sort: SortOrder,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<FirRecord>, StoreError> {
        let filter = filter.clone();
        self.run_blocking(move |conn| find_rows(conn, &filter, sort, skip, limit))
            .await
    }

    async fn count(&self, filter: &RecordFilter) -> Result<u64, StoreError> {
        let filter = filter.clone();
        self.run_blocking(move |conn| count_rows(conn, &filter)).await
    }

    async fn get(&self, report_id: &str) -> Result<Option<FirRecord>, StoreError> {
        let report_id = report_id.to_string();
        self.run_blocking(move |conn| select_one(conn, &report_id))
            .await
    }

    async fn create(&self, record: FirRecord) -> Result<FirRecord, StoreError> {
        self.run_blocking(move |conn| insert_row(conn, record)).await
    }

    async fn update(
        &self,
        report_id: &str,
        patch: &FirPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<FirRecord>, StoreError> {
        let report_id = report_id.to_string();
        let patch = patch.clone();
        self.run_blocking(move |conn| update_row(conn, &report_id, &patch, now))
            .await
    }

    async fn delete(&self, report_id: &str) -> Result<Option<FirRecord>, StoreError> {
        let report_id = report_id.to_string();
        self.run_blocking(move |conn| delete_row(conn, &report_id))
            .await
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        self.run_blocking(|conn| {
            let rows = conn.execute("DELETE FROM firs", [])?;
            Ok(u64::try_from(rows).unwrap_or(0))
        })
        .await
    }
}

fn find_rows(
    conn: &Connection,
    filter: &RecordFilter,
    sort: SortOrder,
    skip: u64,
    limit: u64,
) -> Result<Vec<FirRecord>, StoreError> {
    let (where_sql, params) = where_clause(filter);
    let order_sql = match sort {
        SortOrder::NewestFirst => "created_at DESC, seq DESC",
        SortOrder::OldestFirst => "created_at ASC, seq ASC",
    };
    let sql = format!(
        "SELECT {FIR_COLUMNS} FROM firs{where_sql} ORDER BY {order_sql} LIMIT {limit} OFFSET {skip}"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(duckdb::params_from_iter(params.iter()), FirRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(FirRow::into_record).collect()
}

fn count_rows(conn: &Connection, filter: &RecordFilter) -> Result<u64, StoreError> {
    let (where_sql, params) = where_clause(filter);
    let sql = format!("SELECT COUNT(*) FROM firs{where_sql}");

    let mut stmt = conn.prepare(&sql)?;
    let count: i64 = stmt.query_row(duckdb::params_from_iter(params.iter()), |row| row.get(0))?;
    u64::try_from(count).map_err(|e| StoreError::Conversion {
        message: format!("Negative record count {count}: {e}"),
    })
}

fn insert_row(conn: &Connection, mut record: FirRecord) -> Result<FirRecord, StoreError> {
    record.created_at = record.created_at.trunc_subsecs(6);
    record.updated_at = record.updated_at.trunc_subsecs(6);

    if select_one(conn, &record.report_id)?.is_some() {
        return Err(StoreError::DuplicateReportId(record.report_id));
    }

    conn.execute(
        "INSERT INTO firs (
            report_id, date, time, fir_type, location, complainant, status,
            priority, officer, description, evidence, notes, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        duckdb::params![
            record.report_id,
            record.date,
            record.time,
            record.fir_type.as_ref(),
            record.location,
            record.complainant,
            record.status.as_ref(),
            record.priority.as_ref(),
            record.officer,
            record.description,
            record.evidence,
            record.notes,
            format_timestamp(record.created_at),
            format_timestamp(record.updated_at),
        ],
    )?;

    log::debug!("Inserted FIR {}", record.report_id);
    Ok(record)
}

fn update_row(
    conn: &Connection,
    report_id: &str,
    patch: &FirPatch,
    now: DateTime<Utc>,
) -> Result<Option<FirRecord>, StoreError> {
    let Some(mut record) = select_one(conn, report_id)? else {
        return Ok(None);
    };
    record.apply_patch(patch, now.trunc_subsecs(6));

    conn.execute(
        "UPDATE firs SET
            date = ?, time = ?, fir_type = ?, location = ?, complainant = ?,
            status = ?, priority = ?, officer = ?, description = ?, evidence = ?,
            notes = ?, updated_at = ?
         WHERE report_id = ?",
        duckdb::params![
            record.date,
            record.time,
            record.fir_type.as_ref(),
            record.location,
            record.complainant,
            record.status.as_ref(),
            record.priority.as_ref(),
            record.officer,
            record.description,
            record.evidence,
            record.notes,
            format_timestamp(record.updated_at),
            report_id,
        ],
    )?;

    Ok(Some(record))
}

fn delete_row(conn: &Connection, report_id: &str) -> Result<Option<FirRecord>, StoreError> {
    let Some(record) = select_one(conn, report_id)? else {
        return Ok(None);
    };
    conn.execute("DELETE FROM firs WHERE report_id = ?", [report_id])?;
    Ok(Some(record))
}

fn create_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE SEQUENCE IF NOT EXISTS fir_seq START 1;

        CREATE TABLE IF NOT EXISTS firs (
            report_id TEXT NOT NULL PRIMARY KEY,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            fir_type TEXT NOT NULL,
            location TEXT NOT NULL,
            complainant TEXT NOT NULL,
            status TEXT NOT NULL,
            priority TEXT NOT NULL,
            officer TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            evidence TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            seq BIGINT NOT NULL DEFAULT nextval('fir_seq')
        );",
    )?;

    Ok(())
}

/// Compiles a [`RecordFilter`] into a SQL `WHERE` clause (with a leading
/// space, or empty when the filter has no clauses) and its positional
/// parameters.
fn where_clause(filter: &RecordFilter) -> (String, Vec<String>) {
    if filter.is_empty() {
        return (String::new(), Vec::new());
    }
    if filter.matches_nothing() {
        return (" WHERE FALSE".to_string(), Vec::new());
    }

    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(search) = &filter.search {
        clauses.push(
            "(contains(lower(report_id), lower(?)) \
              OR contains(lower(complainant), lower(?)) \
              OR contains(lower(location), lower(?)) \
              OR contains(lower(officer), lower(?)))"
                .to_string(),
        );
        params.extend(std::iter::repeat_n(search.clone(), 4));
    }
    if let Some(status) = filter.status.as_ref().and_then(FieldFilter::known) {
        clauses.push("status = ?".to_string());
        params.push(status.to_string());
    }
    if let Some(fir_type) = filter.fir_type.as_ref().and_then(FieldFilter::known) {
        clauses.push("fir_type = ?".to_string());
        params.push(fir_type.to_string());
    }
    if let Some(priority) = filter.priority.as_ref().and_then(FieldFilter::known) {
        clauses.push("priority = ?".to_string());
        params.push(priority.to_string());
    }

    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

fn select_one(conn: &Connection, report_id: &str) -> Result<Option<FirRecord>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FIR_COLUMNS} FROM firs WHERE report_id = ?"
    ))?;
    match stmt.query_row([report_id], FirRow::from_row) {
        Ok(row) => row.into_record().map(Some),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(StoreError::DuckDb(e)),
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Conversion {
            message: format!("Invalid stored timestamp {s:?}: {e}"),
        })
}

/// Raw text columns of one `firs` row, in [`FIR_COLUMNS`] order.
struct FirRow([String; 14]);

impl FirRow {
    fn from_row(row: &duckdb::Row<'_>) -> duckdb::Result<Self> {
        let mut cols: [String; 14] = Default::default();
        for (i, col) in cols.iter_mut().enumerate() {
            *col = row.get(i)?;
        }
        Ok(Self(cols))
    }

    fn into_record(self) -> Result<FirRecord, StoreError> {
        let [
            report_id,
            date,
            time,
            fir_type,
            location,
            complainant,
            status,
            priority,
            officer,
            description,
            evidence,
            notes,
            created_at,
            updated_at,
        ] = self.0;

        let conversion = |what: &str, value: &str| StoreError::Conversion {
            message: format!("Invalid stored {what} {value:?} for {report_id}"),
        };

        Ok(FirRecord {
            fir_type: fir_type
                .parse()
                .map_err(|_| conversion("type", &fir_type))?,
            status: status.parse().map_err(|_| conversion("status", &status))?,
            priority: priority
                .parse()
                .map_err(|_| conversion("priority", &priority))?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
            report_id,
            date,
            time,
            location,
            complainant,
            officer,
            description,
            evidence,
            notes,
        })
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
            date: "2024-01-27".to_string(),
            time: "14:32".to_string(),
            fir_type: FirType::Theft,
            location: "Andheri West".to_string(),
            complainant: "Rajesh Kumar".to_string(),
            status: FirStatus::Open,
            priority: FirPriority::High,
            officer: "SI Patil".to_string(),
            description: "Wallet stolen".to_string(),
            evidence: String::new(),
            notes: String::new(),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn empty_filter_has_no_where_clause() {
        let (sql, params) = where_clause(&RecordFilter::default());
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn where_clause_binds_search_once_per_field() {
        let filter = RecordFilter {
            search: Some("patil".to_string()),
            status: Some(FirStatus::Open.into()),
            fir_type: Some(FirType::CyberCrime.into()),
            priority: None,
        };
        let (sql, params) = where_clause(&filter);
        assert!(sql.starts_with(" WHERE ("));
        assert!(sql.contains("AND status = ?"));
        assert!(sql.contains("AND fir_type = ?"));
        assert_eq!(sql.matches('?').count(), params.len());
        assert_eq!(params[..4], ["patil", "patil", "patil", "patil"]);
        assert_eq!(params[4], "open");
        assert_eq!(params[5], "Cyber Crime");
    }

    #[test]
    fn unknown_field_value_compiles_to_false() {
        let filter = RecordFilter::from_params(Some("patil"), Some("Open"), None, None);
        let (sql, params) = where_clause(&filter);
        assert_eq!(sql, " WHERE FALSE");
        assert!(params.is_empty());
    }

    #[tokio::test]
    async fn unknown_field_value_finds_no_records() {
        let store = DuckDbStore::open_in_memory().unwrap();
        store.create(record("FIR-2024-1", 0)).await.unwrap();

        let filter = RecordFilter::from_params(None, None, Some("theft"), None);
        assert_eq!(store.count(&filter).await.unwrap(), 0);
        assert!(
            store
                .find(&filter, SortOrder::NewestFirst, 0, 10)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = DuckDbStore::open_in_memory().unwrap();
        let created = store.create(record("FIR-2024-1", 0)).await.unwrap();
        let fetched = store.get("FIR-2024-1").await.unwrap().unwrap();
        assert_eq!(created, fetched);
        assert!(store.get("FIR-2024-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_report_id_is_rejected() {
        let store = DuckDbStore::open_in_memory().unwrap();
        store.create(record("FIR-2024-1", 0)).await.unwrap();
        let mut dup = record("FIR-2024-1", 10);
        dup.location = "Elsewhere".to_string();
        let err = store.create(dup).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateReportId(id) if id == "FIR-2024-1"));
        let kept = store.get("FIR-2024-1").await.unwrap().unwrap();
        assert_eq!(kept.location, "Andheri West");
    }

    #[tokio::test]
    async fn find_orders_newest_first_with_insertion_tiebreak() {
        let store = DuckDbStore::open_in_memory().unwrap();
        store.create(record("A", 0)).await.unwrap();
        store.create(record("B", 20)).await.unwrap();
        store.create(record("C", 20)).await.unwrap();
        store.create(record("D", 10)).await.unwrap();

        let ids: Vec<String> = store
            .find(&RecordFilter::default(), SortOrder::NewestFirst, 0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.report_id)
            .collect();
        assert_eq!(ids, ["C", "B", "D", "A"]);

        let page: Vec<String> = store
            .find(&RecordFilter::default(), SortOrder::NewestFirst, 1, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.report_id)
            .collect();
        assert_eq!(page, ["B", "D"]);
    }

    #[tokio::test]
    async fn filters_match_in_memory_semantics() {
        let store = DuckDbStore::open_in_memory().unwrap();
        let mut fraud = record("FIR-2024-2", 5);
        fraud.fir_type = FirType::Fraud;
        fraud.complainant = "Amit Verma".to_string();
        store.create(record("FIR-2024-1", 0)).await.unwrap();
        store.create(fraud).await.unwrap();

        let filter = RecordFilter {
            search: Some("VERMA".to_string()),
            ..RecordFilter::default()
        };
        assert_eq!(store.count(&filter).await.unwrap(), 1);

        let filter = RecordFilter {
            fir_type: Some(FirType::Theft.into()),
            ..RecordFilter::default()
        };
        let found = store
            .find(&filter, SortOrder::NewestFirst, 0, 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].report_id, "FIR-2024-1");
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_records() {
        let store = DuckDbStore::open_in_memory().unwrap();
        store.create(record("FIR-2024-1", 0)).await.unwrap();

        let patch = FirPatch {
            status: Some(FirStatus::Investigating),
            ..FirPatch::default()
        };
        let now = Utc::now();
        let updated = store
            .update("FIR-2024-1", &patch, now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, FirStatus::Investigating);
        assert_eq!(
            store.get("FIR-2024-1").await.unwrap().unwrap(),
            updated
        );
        assert!(store.update("nope", &patch, now).await.unwrap().is_none());

        assert!(store.delete("nope").await.unwrap().is_none());
        let deleted = store.delete("FIR-2024-1").await.unwrap().unwrap();
        assert_eq!(deleted.report_id, "FIR-2024-1");
        assert_eq!(store.count(&RecordFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_creates_run_on_the_blocking_pool() {
        let store = Arc::new(DuckDbStore::open_in_memory().unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.create(record(&format!("FIR-2024-{}", i % 4), i)).await
                })
            })
            .collect();

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(StoreError::DuplicateReportId(_)) => duplicates += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!((created, duplicates), (4, 4));
        assert_eq!(store.count(&RecordFilter::default()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn reopening_a_file_keeps_records() {
        let dir = std::env::temp_dir().join("safecity_duckdb_store_test");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("firs.duckdb");

        {
            let store = DuckDbStore::open(&path).unwrap();
            store.create(record("FIR-2024-1", 0)).await.unwrap();
        }

        let store = DuckDbStore::open(&path).unwrap();
        assert_eq!(store.count(&RecordFilter::default()).await.unwrap(), 1);
        assert_eq!(store.clear().await.unwrap(), 1);

        drop(store);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
