#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Record store query types.
//!
//! A [`RecordQuery`] is a pure description of one listing request: the
//! free-text search, the exact-match field filters, and the page window.
//! Store implementations translate the [`RecordFilter`] into their own
//! query language; [`RecordFilter::matches`] is the reference semantics.

use std::str::FromStr;

use safecity_fir_models::{FirPriority, FirRecord, FirStatus, FirType};
use serde::{Deserialize, Serialize};

/// Page size used when a request does not specify one.
pub const DEFAULT_LIMIT: u64 = 8;

/// Filter value meaning "do not filter on this field".
pub const ALL_SENTINEL: &str = "all";

/// Exact-match clause on one enumerated field.
///
/// Request values that do not name a known variant are kept as
/// [`FieldFilter::Unknown`], which matches no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldFilter<T> {
    Is(T),
    Unknown(String),
}

impl<T: Copy + PartialEq> FieldFilter<T> {
    /// Returns `true` if a record whose field holds `value` passes.
    #[must_use]
    pub fn matches(&self, value: T) -> bool {
        matches!(self, Self::Is(v) if *v == value)
    }

    /// The known value, if any.
    #[must_use]
    pub const fn known(&self) -> Option<T> {
        match self {
            Self::Is(v) => Some(*v),
            Self::Unknown(_) => None,
        }
    }
}

impl<T> From<T> for FieldFilter<T> {
    fn from(value: T) -> Self {
        Self::Is(value)
    }
}

/// Search and exact-match filters over FIR records.
///
/// All present clauses are combined with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Case-insensitive substring matched against report ID, complainant,
    /// location, or officer.
    pub search: Option<String>,
    pub status: Option<FieldFilter<FirStatus>>,
    pub fir_type: Option<FieldFilter<FirType>>,
    pub priority: Option<FieldFilter<FirPriority>>,
}

impl RecordFilter {
    /// Builds a filter from raw request parameters.
    ///
    /// Empty values and the `"all"` sentinel mean no filter for that field.
    /// Values that name no known status, type, or priority still filter,
    /// and match nothing.
    #[must_use]
    pub fn from_params(
        search: Option<&str>,
        status: Option<&str>,
        fir_type: Option<&str>,
        priority: Option<&str>,
    ) -> Self {
        Self {
            search: search.filter(|s| !s.is_empty()).map(str::to_string),
            status: parse_filter(status),
            fir_type: parse_filter(fir_type),
            priority: parse_filter(priority),
        }
    }

    /// Returns `true` if no clause is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.status.is_none()
            && self.fir_type.is_none()
            && self.priority.is_none()
    }

    /// Returns `true` if some field clause names an unknown value, so no
    /// record can match.
    #[must_use]
    pub const fn matches_nothing(&self) -> bool {
        matches!(self.status, Some(FieldFilter::Unknown(_)))
            || matches!(self.fir_type, Some(FieldFilter::Unknown(_)))
            || matches!(self.priority, Some(FieldFilter::Unknown(_)))
    }

    /// Returns `true` if `record` satisfies every clause of this filter.
    #[must_use]
    pub fn matches(&self, record: &FirRecord) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = [
                &record.report_id,
                &record.complainant,
                &record.location,
                &record.officer,
            ]
            .iter()
            .any(|haystack| haystack.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        self.status.as_ref().is_none_or(|f| f.matches(record.status))
            && self.fir_type.as_ref().is_none_or(|f| f.matches(record.fir_type))
            && self.priority.as_ref().is_none_or(|f| f.matches(record.priority))
    }
}

fn parse_filter<T: FromStr>(value: Option<&str>) -> Option<FieldFilter<T>> {
    match value {
        None => None,
        Some(v) if v.is_empty() || v == ALL_SENTINEL => None,
        Some(v) => Some(
            v.parse()
                .map_or_else(|_| FieldFilter::Unknown(v.to_string()), FieldFilter::Is),
        ),
    }
}

/// Result ordering for record listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Most recently created first; later insertions win ties.
    #[default]
    NewestFirst,
    /// Oldest created first.
    OldestFirst,
}

/// One page-windowed listing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordQuery {
    /// 1-based page number.
    pub page: u64,
    /// Page size.
    pub limit: u64,
    pub filter: RecordFilter,
}

impl RecordQuery {
    /// Creates a query, clamping `page` and `limit` to at least 1.
    #[must_use]
    pub fn new(page: Option<u64>, limit: Option<u64>, filter: RecordFilter) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).max(1),
            filter,
        }
    }

    /// Number of matching records that precede this page.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self::new(None, None, RecordFilter::default())
    }
}

/// Pagination metadata for a listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Total number of records matching the filter.
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    /// `ceil(total / limit)`.
    pub pages: u64,
}

impl Pagination {
    #[must_use]
    pub const fn new(total: u64, page: u64, limit: u64) -> Self {
        Self {
            total,
            page,
            limit,
            pages: if limit == 0 { 0 } else { total.div_ceil(limit) },
        }
    }
}

/// A page of records plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPage {
    pub records: Vec<FirRecord>,
    pub pagination: Pagination,
}
