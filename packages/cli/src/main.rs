#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the `SafeCity` FIR toolchain.
//!
//! Imports spreadsheets into the record store, exports records as CSV,
//! seeds sample data, lists records, and starts the API server. Run
//! without a subcommand for an interactive menu.
//!
//! Uses `indicatif-log-bridge` (via [`safecity_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod commands;
mod interactive;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use safecity_database::{open_store, paths};
use safecity_database_models::{RecordFilter, RecordQuery};

#[derive(Parser)]
#[command(name = "safecity", about = "SafeCity FIR records toolchain")]
struct Cli {
    /// Record store path, or `:memory:` (defaults to `SAFECITY_DB_PATH`,
    /// then `data/safecity.duckdb`)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import FIRs from an Excel (.xlsx, .xls) or CSV file
    Import {
        /// Spreadsheet to import
        file: PathBuf,
        /// Validate and report without importing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a spreadsheet and show which rows would be imported
    Preview {
        /// Spreadsheet to check
        file: PathBuf,
    },
    /// Export FIRs as Excel or CSV
    Export {
        /// Output file; `.xlsx` writes Excel, `.csv` writes CSV
        output: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Replace all FIRs with sample data
    Seed {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List FIRs, newest first
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Page number (1-based)
        #[arg(long)]
        page: Option<u64>,
        /// Records per page (default 8)
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Start the API server
    Serve,
}

/// Record filters shared by `list` and `export`.
#[derive(Args)]
struct FilterArgs {
    /// Substring of report ID, complainant, location, or officer
    #[arg(long)]
    search: Option<String>,
    /// `open`, `investigating`, `closed`, or `all`
    #[arg(long)]
    status: Option<String>,
    /// Crime type, e.g. `Theft` or `"Cyber Crime"`
    #[arg(long = "type")]
    fir_type: Option<String>,
    /// `low`, `medium`, `high`, or `all`
    #[arg(long)]
    priority: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> RecordFilter {
        RecordFilter::from_params(
            self.search.as_deref(),
            self.status.as_deref(),
            self.fir_type.as_deref(),
            self.priority.as_deref(),
        )
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = safecity_cli_utils::init_logger();
    let cli = Cli::parse();

    let db_path = cli.db.unwrap_or_else(paths::db_path_from_env);

    let Some(command) = cli.command else {
        return interactive::run(&multi, &db_path).await;
    };

    match command {
        Commands::Import {
            file,
            dry_run: true,
        }
        | Commands::Preview { file } => commands::preview_file(&file)?,
        Commands::Import {
            file,
            dry_run: false,
        } => {
            let store = open_store(&db_path)?;
            commands::import_file(store.as_ref(), &multi, &file).await?;
        }
        Commands::Export { output, filter } => {
            let filter = filter.to_filter();
            let store = open_store(&db_path)?;
            commands::export_to(store.as_ref(), &output, &filter).await?;
        }
        Commands::Seed { yes } => {
            let store = open_store(&db_path)?;
            commands::seed_records(store.as_ref(), yes).await?;
        }
        Commands::List {
            filter,
            page,
            limit,
        } => {
            let query = RecordQuery::new(page, limit, filter.to_filter());
            let store = open_store(&db_path)?;
            commands::list_records(store.as_ref(), &query).await?;
        }
        Commands::Serve => serve(db_path, false).await?,
    }

    Ok(())
}

/// Runs the API server against `db_path`, first prompting for the listener
/// settings when `prompt` is set.
///
/// The server uses actix-web's runtime, so it runs in a blocking task to
/// avoid nesting tokio runtimes.
pub(crate) async fn serve(
    db_path: PathBuf,
    prompt: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // SAFETY: set before the server thread starts; read once during
    // server initialisation.
    unsafe {
        std::env::set_var(paths::DB_PATH_ENV, &db_path);
    }

    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(async move {
            if prompt {
                safecity_server::interactive::run().await
            } else {
                safecity_server::run_server().await
            }
        })
    })
    .await??;
    Ok(())
}
