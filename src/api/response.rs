use serde::{Deserialize, Serialize};
use axum::Json;
use axum::http::StatusCode;

/// Error body shared by the endpoint and the client that reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub fn error(status: StatusCode, message: String, details: Option<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message,
            details,
        }),
    )
}
