//! Interactive mode for the server.
//!
//! Prompts for the bind address, port, and record store before starting
//! the server.

use dialoguer::{Confirm, Input};
use safecity_database::paths;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Asks for a bind address, port, and store path, sets the corresponding
/// environment variables (`BIND_ADDR`, `PORT`, `SAFECITY_DB_PATH`), and
/// delegates to [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("SafeCity Server");
    println!();

    let config = super::ServerConfig::from_env();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(config.bind_addr.clone())
        .interact_text()
        .unwrap_or(config.bind_addr);

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(config.port)
        .interact_text()
        .unwrap_or(config.port);

    let db_path: String = Input::new()
        .with_prompt(format!("Record store (path or {})", paths::IN_MEMORY))
        .default(config.db_path.display().to_string())
        .interact_text()
        .unwrap_or_else(|_| config.db_path.display().to_string());

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", port.to_string());
        std::env::set_var(paths::DB_PATH_ENV, &db_path);
    }

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port} using {db_path}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}
