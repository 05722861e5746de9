//! Canonical file paths for the record store.
//!
//! Paths are relative to the working directory unless overridden by the
//! `SAFECITY_DB_PATH` environment variable.

use std::path::{Path, PathBuf};

/// Environment variable naming the record store file.
pub const DB_PATH_ENV: &str = "SAFECITY_DB_PATH";

/// Value of [`DB_PATH_ENV`] that selects an ephemeral in-process store.
pub const IN_MEMORY: &str = ":memory:";

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Returns the default `DuckDB` record store path.
#[must_use]
pub fn default_db_path() -> PathBuf {
    data_dir().join("safecity.duckdb")
}

/// Returns the configured record store path: `SAFECITY_DB_PATH` if set,
/// otherwise [`default_db_path`].
#[must_use]
pub fn db_path_from_env() -> PathBuf {
    std::env::var(DB_PATH_ENV).map_or_else(|_| default_db_path(), PathBuf::from)
}

/// Returns `true` if `path` selects the in-memory store.
#[must_use]
pub fn is_in_memory(path: &Path) -> bool {
    path.as_os_str() == IN_MEMORY
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
