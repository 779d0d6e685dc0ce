use ntex::http::StatusCode;
use ntex::web::{HttpResponse, WebResponseError};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Db(rusqlite::Error),
    NotFound(String),
    Validation(Vec<&'static str>),
    Migration(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {}", e),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Validation(codes) => write!(f, "Validation failed: {}", codes.join(", ")),
            AppError::Migration(msg) => write!(f, "Schema mismatch: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl WebResponseError for AppError {
    fn error_response(&self, _: &ntex::web::HttpRequest) -> HttpResponse {
        match self {
            AppError::Db(e) => {
                tracing::error!("database error: {e}");
                HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
                    .json(&serde_json::json!({ "error": "internal_error" }))
            }
            AppError::NotFound(_) => HttpResponse::build(StatusCode::NOT_FOUND)
                .json(&serde_json::json!({ "error": "not_found" })),
            AppError::Validation(codes) => HttpResponse::build(StatusCode::BAD_REQUEST).json(
                &serde_json::json!({ "error": "validation_failed", "details": codes }),
            ),
            AppError::Migration(msg) => {
                tracing::error!("schema mismatch: {msg}");
                HttpResponse::build(StatusCode::SERVICE_UNAVAILABLE)
                    .json(&serde_json::json!({ "error": "migration_pending" }))
            }
            AppError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
                    .json(&serde_json::json!({ "error": "internal_error" }))
            }
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        // A statement failing against a missing table or column means the
        // database file is behind this binary's schema.
        let msg = e.to_string();
        if msg.contains("no such table") || msg.contains("no such column") {
            AppError::Migration(msg)
        } else {
            AppError::Db(e)
        }
    }
}
