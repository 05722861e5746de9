//! Interactive menu for the `SafeCity` toolchain.
//!
//! Lets users pick an action and fill in its arguments with `dialoguer`
//! prompts instead of memorizing subcommands and flags.

use std::path::{Path, PathBuf};

use chrono::Utc;
use dialoguer::{Input, Select};
use safecity_cli_utils::MultiProgress;
use safecity_database::open_store;
use safecity_database_models::{ALL_SENTINEL, DEFAULT_LIMIT, RecordFilter, RecordQuery};
use safecity_fir_models::{FirPriority, FirStatus, FirType};
use safecity_import::export::{ExportFormat, export_file_name};

use crate::commands;

/// Top-level actions in the interactive menu.
enum Action {
    Import,
    Preview,
    Export,
    List,
    Seed,
    Serve,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Import,
        Self::Preview,
        Self::Export,
        Self::List,
        Self::Seed,
        Self::Serve,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Import => "Import a spreadsheet",
            Self::Preview => "Preview a spreadsheet (no import)",
            Self::Export => "Export FIRs to Excel or CSV",
            Self::List => "List FIRs",
            Self::Seed => "Seed sample FIRs",
            Self::Serve => "Start server",
        }
    }
}

/// Runs the interactive menu against the store at `db_path`.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected action fails.
pub async fn run(multi: &MultiProgress, db_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("SafeCity FIR Toolchain");
    println!("Record store: {}", db_path.display());
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Import | Action::Preview => {
            let file: String = Input::new()
                .with_prompt("Spreadsheet path (.xlsx, .xls, .csv)")
                .interact_text()?;
            if matches!(Action::ALL[idx], Action::Preview) {
                commands::preview_file(Path::new(&file))?;
            } else {
                let store = open_store(db_path)?;
                commands::import_file(store.as_ref(), multi, Path::new(&file)).await?;
            }
        }
        Action::Export => {
            let output: String = Input::new()
                .with_prompt("Output file (.xlsx or .csv)")
                .default(export_file_name(Utc::now(), ExportFormat::Xlsx))
                .interact_text()?;
            let filter = prompt_filter()?;
            let store = open_store(db_path)?;
            commands::export_to(store.as_ref(), Path::new(&output), &filter).await?;
        }
        Action::List => {
            let filter = prompt_filter()?;
            let limit: u64 = Input::new()
                .with_prompt("Records per page")
                .default(DEFAULT_LIMIT)
                .interact_text()?;
            let page: u64 = Input::new()
                .with_prompt("Page")
                .default(1)
                .interact_text()?;
            let store = open_store(db_path)?;
            commands::list_records(store.as_ref(), &RecordQuery::new(Some(page), Some(limit), filter))
                .await?;
        }
        Action::Seed => {
            let store = open_store(db_path)?;
            commands::seed_records(store.as_ref(), false).await?;
        }
        Action::Serve => crate::serve(PathBuf::from(db_path), true).await?,
    }

    Ok(())
}

/// Prompts for a search term and the three enumerated filters.
fn prompt_filter() -> Result<RecordFilter, Box<dyn std::error::Error>> {
    let search: String = Input::new()
        .with_prompt("Search (blank for none)")
        .allow_empty(true)
        .interact_text()?;

    let status = select_value("Status", FirStatus::all())?;
    let fir_type = select_value("Type", FirType::all())?;
    let priority = select_value("Priority", FirPriority::all())?;

    Ok(RecordFilter::from_params(
        Some(search.as_str()),
        Some(status.as_str()),
        Some(fir_type.as_str()),
        Some(priority.as_str()),
    ))
}

/// Offers `all` plus every variant, returning the chosen value's name.
fn select_value<T: AsRef<str>>(
    prompt: &str,
    values: &[T],
) -> Result<String, Box<dyn std::error::Error>> {
    let mut items = vec![ALL_SENTINEL];
    items.extend(values.iter().map(AsRef::as_ref));

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;
    Ok(items[idx].to_string())
}
