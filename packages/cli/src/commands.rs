//! Implementations of the CLI commands.
//!
//! Each command works against any [`RecordStore`]; `main` opens the store
//! selected by `--db` and hands it in.

use std::path::Path;

use chrono::Utc;
use dialoguer::Confirm;
use safecity_cli_utils::{IndicatifProgress, MultiProgress};
use safecity_database::{RecordStore, queries, seed};
use safecity_database_models::{RecordFilter, RecordQuery};
use safecity_import::export::{self, ExportFormat};
use safecity_import::{ImportFile, ImportReport, ImportSession, ValidationReport};

/// Rows of validation errors printed before eliding the rest.
const MAX_ERRORS_SHOWN: usize = 20;

/// Parses and validates a spreadsheet without touching any record store.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn preview_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = ImportFile::from_path(path)?;
    let mut session = ImportSession::new();

    let validation = session.parse(&file)?;
    print_validation(&file.name, validation);
    log::info!("Dry run: nothing imported");
    Ok(())
}

/// Parses, validates, and imports a spreadsheet.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if it has no
/// valid records to import.
pub async fn import_file(
    store: &dyn RecordStore,
    multi: &MultiProgress,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = ImportFile::from_path(path)?;
    let mut session = ImportSession::new();

    let validation = session.parse(&file)?;
    print_validation(&file.name, validation);

    let progress = IndicatifProgress::records_bar(multi, "Importing FIRs...");
    let report = session.import(store, progress.as_ref()).await?;
    print_report(&report);

    Ok(())
}

/// Writes every record matching `filter` to `output`, as Excel for an
/// `.xlsx` path and CSV for a `.csv` path.
///
/// # Errors
///
/// Returns an error if the extension is neither, or if the store query or
/// the file write fails.
pub async fn export_to(
    store: &dyn RecordStore,
    output: &Path,
    filter: &RecordFilter,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = ExportFormat::from_path(output)?;
    let records = queries::export_records(store, filter).await?;
    std::fs::write(output, export::to_bytes(format, &records)?)?;
    log::info!("Exported {} FIRs to {}", records.len(), output.display());
    Ok(())
}

/// Replaces the store contents with the sample FIRs.
///
/// Asks for confirmation unless `yes` is set.
///
/// # Errors
///
/// Returns an error if the prompt or any store operation fails.
pub async fn seed_records(
    store: &dyn RecordStore,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !yes
        && !Confirm::new()
            .with_prompt("This deletes every existing FIR. Continue?")
            .default(false)
            .interact()?
    {
        println!("Cancelled.");
        return Ok(());
    }

    let created = seed::seed_store(store, Utc::now()).await?;
    println!("Seeded {} sample FIRs.", created.len());
    Ok(())
}

/// Prints one page of records.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub async fn list_records(
    store: &dyn RecordStore,
    query: &RecordQuery,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = queries::query_records(store, query).await?;

    println!(
        "{:<16} {:<11} {:<6} {:<12} {:<14} {:<20} {:<14} {:<7} OFFICER",
        "REPORT ID", "DATE", "TIME", "TYPE", "STATUS", "LOCATION", "COMPLAINANT", "PRIORITY"
    );
    println!("{}", "-".repeat(120));
    for record in &page.records {
        println!(
            "{:<16} {:<11} {:<6} {:<12} {:<14} {:<20} {:<14} {:<7} {}",
            record.report_id,
            record.date,
            record.time,
            record.fir_type,
            record.status,
            record.location,
            record.complainant,
            record.priority,
            record.officer,
        );
    }

    let p = page.pagination;
    println!();
    println!(
        "Page {} of {} ({} FIRs, {} per page)",
        p.page,
        p.pages.max(1),
        p.total,
        p.limit
    );
    Ok(())
}

fn print_validation(file_name: &str, validation: &ValidationReport) {
    println!(
        "{file_name}: {} rows, {} valid, {} with errors",
        validation.total_records,
        validation.valid_count(),
        validation.error_count()
    );

    for row_error in validation.errors.iter().take(MAX_ERRORS_SHOWN) {
        let messages: Vec<String> = row_error.errors.iter().map(ToString::to_string).collect();
        println!("  Row {}: {}", row_error.row, messages.join("; "));
    }
    if validation.error_count() > MAX_ERRORS_SHOWN {
        println!(
            "  ... and {} more rows with errors",
            validation.error_count() - MAX_ERRORS_SHOWN
        );
    }
}

fn print_report(report: &ImportReport) {
    println!(
        "Imported {} of {} FIRs ({} failed)",
        report.succeeded,
        report.total,
        report.failed()
    );
    for failure in &report.failures {
        println!("  Row {}: {}", failure.row, failure.error);
    }
}
