//! Progress reporting for record submission.
//!
//! The import loop reports through [`ProgressCallback`] so the same code can
//! drive an `indicatif` bar in the CLI, nothing at all in the HTTP server,
//! or a recorder in tests.

/// Receives progress updates while an import submits records.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of records that will be submitted.
    fn set_total(&self, total: u64);

    /// Marks `delta` more records as attempted.
    fn inc(&self, delta: u64);

    /// Replaces the status line shown with the progress indicator.
    fn set_message(&self, msg: String);

    /// Marks the import finished with a summary line.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

