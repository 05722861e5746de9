#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the `SafeCity` server.
//!
//! Every JSON response carries a `success` flag. Successful responses put
//! their payload under `data`; failures carry a single `error` message.
//! These types are separate from the store types so the API contract can
//! evolve independently.

use safecity_database_models::{Pagination, RecordFilter, RecordQuery};
use safecity_fir_models::FirRecord;
use safecity_import::export::ExportFormat;
use safecity_import::{ImportError, ImportReport, ValidationReport};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Successful response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Failure response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub success: bool,
    pub error: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// One page of records from `GET /api/records`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecordList {
    pub success: bool,
    pub data: Vec<FirRecord>,
    pub pagination: Pagination,
}

/// Query parameters for the record listing and export endpoints.
///
/// `status`, `type`, and `priority` accept `"all"` or an empty value to
/// disable that filter; any other unrecognized value matches no records.
/// The export endpoint ignores `page` and `limit`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQueryParams {
    /// Free-text search over report ID, complainant, location, and officer.
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub fir_type: Option<String>,
    pub priority: Option<String>,
    /// 1-based page number.
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
    /// Export file format, `csv` (default) or `xlsx`. Ignored by listing.
    pub format: Option<String>,
}

impl RecordQueryParams {
    /// Parses the filter parameters.
    #[must_use]
    pub fn filter(&self) -> RecordFilter {
        RecordFilter::from_params(
            self.search.as_deref(),
            self.status.as_deref(),
            self.fir_type.as_deref(),
            self.priority.as_deref(),
        )
    }

    /// Builds the paginated listing query.
    #[must_use]
    pub fn to_query(&self) -> RecordQuery {
        RecordQuery::new(self.page, self.limit, self.filter())
    }

    /// The requested export format; an absent or empty value means CSV.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::UnsupportedExportFormat`] for any name other
    /// than `csv` or `xlsx`.
    pub fn export_format(&self) -> Result<ExportFormat, ImportError> {
        match self.format.as_deref() {
            None | Some("") => Ok(ExportFormat::default()),
            Some(name) => ExportFormat::from_name(name),
        }
    }
}

/// Query parameters for the import endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportParams {
    /// Original name of the uploaded file; its extension selects the
    /// parser.
    pub filename: String,
}

/// Response of the import preview and import endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiImportResponse {
    pub success: bool,
    pub file_name: String,
    pub validation: ValidationReport,
    /// Submission outcome; absent for a preview.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ImportReport>,
}
