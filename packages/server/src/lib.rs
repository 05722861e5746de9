#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for `SafeCity` FIR records.
//!
//! Serves the REST API for listing, searching, creating, updating, and
//! deleting FIRs, exporting them as CSV or Excel, and previewing or running bulk
//! spreadsheet imports. Records live in the store selected by
//! `SAFECITY_DB_PATH` (a `DuckDB` file by default, or `:memory:`).

mod handlers;
pub mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, error, middleware, web};
use safecity_database::{RecordStore, open_store, paths};
use safecity_server_models::ApiError;

/// Largest accepted request body (spreadsheet uploads).
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state.
pub struct AppState {
    /// FIR record store.
    pub store: Arc<dyn RecordStore>,
}

/// Listener and store settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `BIND_ADDR`, default `127.0.0.1`.
    pub bind_addr: String,
    /// `PORT`, default `8080`.
    pub port: u16,
    /// `SAFECITY_DB_PATH`, default `data/safecity.duckdb`.
    pub db_path: PathBuf,
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Self {
            bind_addr,
            port,
            db_path: paths::db_path_from_env(),
        }
    }
}

/// Registers the `/api` routes and request extractor settings.
///
/// Malformed JSON bodies and query strings are answered with a 400
/// `{success: false, error}` body.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ApiError::new(err.to_string()));
        error::InternalError::from_response(err, response).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ApiError::new(err.to_string()));
        error::InternalError::from_response(err, response).into()
    }))
    .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/records", web::get().to(handlers::list_records))
            .route("/records", web::post().to(handlers::create_record))
            .route("/records/export", web::get().to(handlers::export_records))
            .route(
                "/records/import/preview",
                web::post().to(handlers::preview_import),
            )
            .route("/records/import", web::post().to(handlers::run_import))
            .route("/records/{id}", web::get().to(handlers::get_record))
            .route("/records/{id}", web::put().to(handlers::update_record))
            .route("/records/{id}", web::delete().to(handlers::delete_record)),
    );
}

/// Starts the `SafeCity` API server.
///
/// Reads [`ServerConfig`] from the environment, opens the record store,
/// and starts the Actix-Web HTTP server. The caller provides the async
/// runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the record store cannot be opened.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    // The CLI installs its own logger before starting the server.
    pretty_env_logger::try_init_custom_env("RUST_LOG").ok();

    let config = ServerConfig::from_env();

    log::info!("Opening record store at {}...", config.db_path.display());
    let store = open_store(&config.db_path).expect("Failed to open record store");

    let state = web::Data::new(AppState { store });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
