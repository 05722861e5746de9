//! The upload → preview → import state machine.
//!
//! An [`ImportSession`] parses one file into a validation preview, then
//! submits the valid records to a [`RecordStore`] strictly one at a time in
//! original row order. A failed submission is recorded against its row and
//! the loop moves on; there are no retries and no rollback.

use std::time::Duration;

use chrono::Utc;
use safecity_database::{RecordStore, queries::create_record};
use safecity_fir_models::NewFir;
use serde::Serialize;

use crate::ImportError;
use crate::parse::{ImportFile, parse_file};
use crate::progress::ProgressCallback;
use crate::validate::{ValidationReport, validate_rows};

/// Pause before a fully successful import reports [`ImportState::Done`].
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Where an [`ImportSession`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    /// Waiting for a file.
    Upload,
    /// A file was parsed and validated; the preview is available.
    Preview,
    /// Records are being submitted.
    Importing { completed: usize, total: usize },
    /// Submission finished; the report is available.
    Done,
}

impl ImportState {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Preview => "preview",
            Self::Importing { .. } => "importing",
            Self::Done => "done",
        }
    }
}

/// A valid row whose submission was rejected by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    /// Row number in the original file.
    pub row: usize,
    pub record: NewFir,
    pub error: String,
}

/// Outcome of submitting a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Number of submissions attempted.
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// One file's trip through the import pipeline.
#[derive(Debug)]
pub struct ImportSession {
    settle_delay: Duration,
    state: ImportState,
    file_name: Option<String>,
    validation: Option<ValidationReport>,
    report: Option<ImportReport>,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSession {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            state: ImportState::Upload,
            file_name: None,
            validation: None,
            report: None,
        }
    }

    /// Overrides the pause taken after a fully successful import.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    #[must_use]
    pub const fn state(&self) -> ImportState {
        self.state
    }

    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The validation preview, available from [`ImportState::Preview`] on.
    #[must_use]
    pub const fn validation(&self) -> Option<&ValidationReport> {
        self.validation.as_ref()
    }

    /// The submission report, available in [`ImportState::Done`].
    #[must_use]
    pub const fn report(&self) -> Option<&ImportReport> {
        self.report.as_ref()
    }

    /// Parses and validates `file`, moving to [`ImportState::Preview`].
    ///
    /// A new file may replace an existing preview. On failure the session
    /// is back in [`ImportState::Upload`] with nothing retained.
    ///
    /// # Errors
    ///
    /// * [`ImportError::InvalidState`] while importing or after completion
    /// * any parse error from [`parse_file`]
    pub fn parse(&mut self, file: &ImportFile) -> Result<&ValidationReport, ImportError> {
        if !matches!(self.state, ImportState::Upload | ImportState::Preview) {
            return Err(ImportError::InvalidState {
                action: "parse a file",
                state: self.state.name(),
            });
        }

        self.reset();
        let rows = parse_file(file)?;
        let validation = validate_rows(&rows);

        self.file_name = Some(file.name.clone());
        self.state = ImportState::Preview;
        Ok(self.validation.insert(validation))
    }

    /// Submits every valid record to `store`, one at a time.
    ///
    /// Each submission is awaited before the next begins. Rejections are
    /// recorded in the report and do not stop the loop. When every
    /// submission succeeds the session waits the settle delay before
    /// reporting [`ImportState::Done`].
    ///
    /// Dropping the returned future stops further submissions; records
    /// already created stay in the store.
    ///
    /// # Errors
    ///
    /// * [`ImportError::InvalidState`] unless in [`ImportState::Preview`]
    /// * [`ImportError::NoValidRecords`] if nothing passed validation (the
    ///   session stays in preview)
    pub async fn import(
        &mut self,
        store: &dyn RecordStore,
        progress: &dyn ProgressCallback,
    ) -> Result<ImportReport, ImportError> {
        let records = match (&self.state, &self.validation) {
            (ImportState::Preview, Some(validation)) => validation.valid_records.clone(),
            (state, _) => {
                return Err(ImportError::InvalidState {
                    action: "import",
                    state: state.name(),
                });
            }
        };
        if records.is_empty() {
            return Err(ImportError::NoValidRecords);
        }

        let total = records.len();
        self.state = ImportState::Importing {
            completed: 0,
            total,
        };
        progress.set_total(total as u64);
        progress.set_message(self.progress_message());

        let mut report = ImportReport {
            total,
            ..ImportReport::default()
        };

        for valid in records {
            match create_record(store, valid.record.clone(), Utc::now()).await {
                Ok(created) => {
                    log::debug!("Row {} imported as {}", valid.row, created.report_id);
                    report.succeeded += 1;
                }
                Err(e) => {
                    log::warn!("Row {} failed to import: {e}", valid.row);
                    report.failures.push(ImportFailure {
                        row: valid.row,
                        record: valid.record,
                        error: e.to_string(),
                    });
                }
            }

            if let ImportState::Importing { completed, .. } = &mut self.state {
                *completed += 1;
            }
            progress.inc(1);
            progress.set_message(self.progress_message());
        }

        log::info!(
            "Imported {} of {} records from {}",
            report.succeeded,
            report.total,
            self.file_name.as_deref().unwrap_or("upload"),
        );

        if report.is_success() {
            if !self.settle_delay.is_zero() {
                tokio::time::sleep(self.settle_delay).await;
            }
            progress.finish(format!("Imported {} records", report.succeeded));
        } else {
            progress.finish(format!(
                "Imported {} records, {} failed",
                report.succeeded,
                report.failed()
            ));
        }

        self.report = Some(report.clone());
        self.state = ImportState::Done;
        Ok(report)
    }

    /// Returns to [`ImportState::Upload`], discarding the preview, progress,
    /// and report.
    pub fn reset(&mut self) {
        self.state = ImportState::Upload;
        self.file_name = None;
        self.validation = None;
        self.report = None;
    }

    /// Submission progress as `"N of Total completed"`.
    #[must_use]
    pub fn progress_message(&self) -> String {
        let (completed, total) = match (self.state, &self.report, &self.validation) {
            (ImportState::Importing { completed, total }, _, _) => (completed, total),
            (ImportState::Done, Some(report), _) => (report.total, report.total),
            (_, _, Some(validation)) => (0, validation.valid_count()),
            _ => (0, 0),
        };
        format!("{completed} of {total} completed")
    }
}
