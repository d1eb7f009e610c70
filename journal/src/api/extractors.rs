use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;

use crate::error::JournalError;

/// `axum::Json` with rejections reported as [`JournalError::Validation`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JournalError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for JournalError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> JournalError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            JournalError::Validation(describe_data_error(&err.body_text()))
        }
        JsonRejection::JsonSyntaxError(err) => {
            JournalError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => JournalError::Validation(
            "Missing `Content-Type: application/json` header".to_string(),
        ),
        JsonRejection::BytesRejection(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            JournalError::Validation("Request body too large".to_string())
        }
        JsonRejection::BytesRejection(_) => {
            JournalError::Internal("Failed to read request body".to_string())
        }
        _ => JournalError::Validation(rejection.body_text()),
    }
}

/// Entries are `{text, userId}` string pairs, so serde's data errors reduce
/// to a missing field or a non-string value.
fn describe_data_error(message: &str) -> String {
    if let Some(field) = backticked_after(message, "missing field `") {
        return format!("Missing required field: {field}");
    }
    if message.contains("invalid type") && message.contains("expected a string") {
        return "`text` and `userId` must be strings".to_string();
    }
    format!("Invalid JSON: {message}")
}

fn backticked_after<'a>(message: &'a str, marker: &str) -> Option<&'a str> {
    let (_, rest) = message.split_once(marker)?;
    rest.split_once('`').map(|(name, _)| name)
}
