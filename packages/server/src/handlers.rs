//! HTTP handler functions for the `SafeCity` API.

use std::time::Duration;

use actix_web::{HttpResponse, http::header, web};
use chrono::Utc;
use safecity_database::{StoreError, queries};
use safecity_fir_models::{FirPatch, NewFir};
use safecity_import::{ImportError, ImportFile, ImportSession, export, progress::NullProgress};
use safecity_server_models::{
    ApiError, ApiHealth, ApiImportResponse, ApiRecordList, ApiResponse, ImportParams,
    RecordQueryParams,
};

use crate::AppState;

const NOT_FOUND: &str = "FIR not found";

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/records`
///
/// Lists records newest first with search, filters, and pagination.
pub async fn list_records(
    state: web::Data<AppState>,
    params: web::Query<RecordQueryParams>,
) -> HttpResponse {
    let query = params.to_query();

    match queries::query_records(state.store.as_ref(), &query).await {
        Ok(page) => HttpResponse::Ok().json(ApiRecordList {
            success: true,
            data: page.records,
            pagination: page.pagination,
        }),
        Err(e) => store_failure("Failed to fetch FIRs", &e),
    }
}

/// `GET /api/records/export`
///
/// Downloads every record matching the filters as CSV, or as an Excel
/// workbook with `format=xlsx`.
pub async fn export_records(
    state: web::Data<AppState>,
    params: web::Query<RecordQueryParams>,
) -> HttpResponse {
    let format = match params.export_format() {
        Ok(format) => format,
        Err(e) => return HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    };

    let records = match queries::export_records(state.store.as_ref(), &params.filter()).await {
        Ok(records) => records,
        Err(e) => return store_failure("Failed to export FIRs", &e),
    };

    match export::to_bytes(format, &records) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(format.content_type())
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    export::export_file_name(Utc::now(), format)
                ),
            ))
            .body(bytes),
        Err(e) => {
            log::error!("Failed to write {format:?} export: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to export FIRs"))
        }
    }
}

/// `GET /api/records/{id}`
pub async fn get_record(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match queries::get_record(state.store.as_ref(), &path).await {
        Ok(Some(record)) => HttpResponse::Ok().json(ApiResponse::ok(record)),
        Ok(None) => HttpResponse::NotFound().json(ApiError::new(NOT_FOUND)),
        Err(e) => store_failure("Failed to fetch FIR", &e),
    }
}

/// `POST /api/records`
pub async fn create_record(state: web::Data<AppState>, body: web::Json<NewFir>) -> HttpResponse {
    match queries::create_record(state.store.as_ref(), body.into_inner(), Utc::now()).await {
        Ok(record) => HttpResponse::Created()
            .json(ApiResponse::ok(record).with_message("FIR created successfully")),
        Err(e @ (StoreError::Invalid { .. } | StoreError::DuplicateReportId(_))) => {
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
        Err(e) => store_failure("Failed to create FIR", &e),
    }
}

/// `PUT /api/records/{id}`
///
/// Replaces the fields present in the body; absent fields are kept.
pub async fn update_record(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<FirPatch>,
) -> HttpResponse {
    match queries::update_record(state.store.as_ref(), &path, &body, Utc::now()).await {
        Ok(Some(record)) => HttpResponse::Ok()
            .json(ApiResponse::ok(record).with_message("FIR updated successfully")),
        Ok(None) => HttpResponse::NotFound().json(ApiError::new(NOT_FOUND)),
        Err(e @ StoreError::Invalid { .. }) => {
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
        Err(e) => store_failure("Failed to update FIR", &e),
    }
}

/// `DELETE /api/records/{id}`
pub async fn delete_record(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match queries::delete_record(state.store.as_ref(), &path).await {
        Ok(Some(record)) => HttpResponse::Ok()
            .json(ApiResponse::ok(record).with_message("FIR deleted successfully")),
        Ok(None) => HttpResponse::NotFound().json(ApiError::new(NOT_FOUND)),
        Err(e) => store_failure("Failed to delete FIR", &e),
    }
}

/// `POST /api/records/import/preview?filename=`
///
/// Parses and validates the uploaded file without storing anything.
pub async fn preview_import(params: web::Query<ImportParams>, body: web::Bytes) -> HttpResponse {
    let file = ImportFile::new(params.into_inner().filename, body.to_vec());
    let mut session = ImportSession::new();

    match session.parse(&file) {
        Ok(validation) => HttpResponse::Ok().json(ApiImportResponse {
            success: true,
            file_name: file.name.clone(),
            validation: validation.clone(),
            report: None,
        }),
        Err(e) => import_failure(&file.name, &e),
    }
}

/// `POST /api/records/import?filename=`
///
/// Parses, validates, and imports the uploaded file, one record at a time.
pub async fn run_import(
    state: web::Data<AppState>,
    params: web::Query<ImportParams>,
    body: web::Bytes,
) -> HttpResponse {
    let file = ImportFile::new(params.into_inner().filename, body.to_vec());
    let mut session = ImportSession::new().with_settle_delay(Duration::ZERO);

    let validation = match session.parse(&file) {
        Ok(validation) => validation.clone(),
        Err(e) => return import_failure(&file.name, &e),
    };

    match session.import(state.store.as_ref(), &NullProgress).await {
        Ok(report) => HttpResponse::Ok().json(ApiImportResponse {
            success: report.is_success(),
            file_name: file.name,
            validation,
            report: Some(report),
        }),
        Err(e) => import_failure(&file.name, &e),
    }
}

fn store_failure(context: &str, e: &StoreError) -> HttpResponse {
    log::error!("{context}: {e}");
    HttpResponse::InternalServerError().json(ApiError::new(context))
}

fn import_failure(file_name: &str, e: &ImportError) -> HttpResponse {
    log::warn!("Import of {file_name} rejected: {e}");
    match e {
        ImportError::Io(_) | ImportError::InvalidState { .. } => {
            HttpResponse::InternalServerError().json(ApiError::new(e.to_string()))
        }
        _ => HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    }
}
