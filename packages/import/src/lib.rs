#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Bulk import of FIR records from spreadsheets.
//!
//! The pipeline is: [`parse`] turns an uploaded `.xlsx`/`.xls`/`.csv` file
//! into raw header-keyed rows, [`normalize`] maps arbitrary column names
//! onto the canonical FIR fields, [`validate`] applies the per-field rules
//! and partitions the batch, and [`session::ImportSession`] drives the
//! upload → preview → import state machine, submitting valid records to a
//! [`safecity_database::RecordStore`] one at a time.
//!
//! [`export`] writes records back out as CSV or Excel, in a layout this
//! pipeline re-imports.

pub mod export;
pub mod normalize;
pub mod parse;
pub mod progress;
pub mod session;
pub mod validate;

pub use parse::{FileFormat, ImportFile};
pub use session::{ImportFailure, ImportReport, ImportSession, ImportState};
pub use validate::{RowError, ValidRecord, ValidationError, ValidationReport};

/// Errors that abort an import attempt.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The file extension is not one of `.xlsx`, `.xls`, `.csv`.
    #[error("Unsupported file format for {file_name:?}. Please use Excel (.xlsx, .xls) or CSV (.csv)")]
    UnsupportedFormat {
        /// Name of the rejected file.
        file_name: String,
    },

    /// The file parsed but produced no data rows.
    #[error("No data found in file")]
    NoData,

    /// CSV parse error.
    #[error("Failed to parse CSV file: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet parse error.
    #[error("Failed to parse Excel file: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// Excel export error.
    #[error("Failed to write Excel file: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// The export target is not `.csv` or `.xlsx`.
    #[error("Unsupported export format {0:?}. Please use CSV (.csv) or Excel (.xlsx)")]
    UnsupportedExportFormat(String),

    /// Import was requested but no row passed validation.
    #[error("No valid records to import")]
    NoValidRecords,

    /// The requested transition is not allowed from the current state.
    #[error("Cannot {action} while the import session is in the {state} state")]
    InvalidState {
        /// The attempted operation.
        action: &'static str,
        /// The state the session was in.
        state: &'static str,
    },

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
