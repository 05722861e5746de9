#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! FIR record store for `SafeCity`.
//!
//! The [`RecordStore`] trait is the document-store seam: find-with-filter,
//! count, create, update, and delete keyed by the unique report identifier.
//! Two bindings are provided: [`duckdb_store::DuckDbStore`] persists to an
//! embedded `DuckDB` file, [`memory::MemoryStore`] keeps everything in
//! process. The [`queries`] module builds listings and record operations on
//! top of any store.

pub mod duckdb_store;
pub mod memory;
pub mod paths;
pub mod queries;
pub mod seed;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safecity_database_models::{RecordFilter, SortOrder};
use safecity_fir_models::{FirPatch, FirRecord};

/// Errors that can occur during record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record with this report ID already exists.
    #[error("FIR with report ID {0} already exists")]
    DuplicateReportId(String),

    /// The record was rejected before reaching the store.
    #[error("{message}")]
    Invalid {
        /// Description of what was rejected.
        message: String,
    },

    /// A stored value could not be converted back into a record.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// The store cannot serve requests.
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// `DuckDB` error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A document collection of FIR records keyed by report ID.
///
/// Implementations serialize writes per record; callers need no locking.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the records matching `filter`, ordered by `sort`, skipping
    /// `skip` and returning at most `limit`.
    async fn find(
        &self,
        filter: &RecordFilter,
        sort: SortOrder,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<FirRecord>, StoreError>;

    /// Counts the records matching `filter`.
    async fn count(&self, filter: &RecordFilter) -> Result<u64, StoreError>;

    /// Fetches a single record by report ID.
    async fn get(&self, report_id: &str) -> Result<Option<FirRecord>, StoreError>;

    /// Inserts a new record.
    ///
    /// Fails with [`StoreError::DuplicateReportId`] if the report ID is
    /// taken; existing records are never overwritten.
    async fn create(&self, record: FirRecord) -> Result<FirRecord, StoreError>;

    /// Applies `patch` to the record with `report_id`, returning the
    /// updated record or `None` if it does not exist.
    async fn update(
        &self,
        report_id: &str,
        patch: &FirPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<FirRecord>, StoreError>;

    /// Removes the record with `report_id`, returning it or `None` if it
    /// does not exist.
    async fn delete(&self, report_id: &str) -> Result<Option<FirRecord>, StoreError>;

    /// Removes every record, returning how many were deleted.
    async fn clear(&self) -> Result<u64, StoreError>;
}

/// Opens the store selected by `path`: the in-memory store for
/// [`paths::IN_MEMORY`], a `DuckDB` file otherwise.
///
/// # Errors
///
/// Returns [`StoreError`] if the `DuckDB` file cannot be opened.
pub fn open_store(path: &Path) -> Result<Arc<dyn RecordStore>, StoreError> {
    if paths::is_in_memory(path) {
        log::info!("Using in-memory FIR store");
        return Ok(Arc::new(memory::MemoryStore::new()));
    }
    Ok(Arc::new(duckdb_store::DuckDbStore::open(path)?))
}
