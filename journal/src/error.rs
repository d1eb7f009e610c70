use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl JournalError {
    pub fn status(&self) -> StatusCode {
        match self {
            JournalError::Validation(_) | JournalError::Json(_) => StatusCode::BAD_REQUEST,
            JournalError::ModelUnavailable(_)
            | JournalError::StorageUnavailable(_)
            | JournalError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            JournalError::Http(_) => StatusCode::BAD_GATEWAY,
            JournalError::Classifier(_) | JournalError::Io(_) | JournalError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for JournalError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            JournalError::Validation(msg) => msg.clone(),
            JournalError::Json(e) => format!("Invalid JSON: {e}"),
            JournalError::ModelUnavailable(msg) => format!("Emotion model unavailable: {msg}"),
            JournalError::StorageUnavailable(msg) => format!("Entry store unavailable: {msg}"),
            JournalError::Database(_) => {
                tracing::error!(error = %self, "Entry store failure");
                "Entry store unavailable".to_string()
            }
            JournalError::Http(_) => {
                tracing::error!(error = %self, "Upstream request failed");
                "Upstream request failed".to_string()
            }
            JournalError::Classifier(_) | JournalError::Io(_) | JournalError::Internal(_) => {
                tracing::error!(error = %self, "Internal error");
                "An internal error occurred".to_string()
            }
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, JournalError>;
