use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;

pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred.";
pub const PARSE_ERROR_MESSAGE: &str = "Could not parse the model output.";

/// Failures of the generation endpoint.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Server configuration error: API key is missing")]
    MissingApiKey,

    #[error("The model returned an empty response")]
    EmptyModelOutput,

    #[error("Could not parse model output: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("LLM processing error: {0}")]
    LlmError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::MissingApiKey
            | AppError::EmptyModelOutput
            | AppError::ParseError(_)
            | AppError::LlmError(_)
            | AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, details) = match self {
            AppError::InvalidInput(msg) => {
                tracing::warn!("Rejected request: {}", msg);
                (msg, None)
            }
            AppError::MissingApiKey => {
                tracing::error!("API_KEY is not set");
                (
                    "Server configuration error: missing API key. Set the API_KEY environment variable on the host.".to_string(),
                    None,
                )
            }
            AppError::EmptyModelOutput => {
                tracing::error!("Model returned an empty response");
                (
                    INTERNAL_ERROR_MESSAGE.to_string(),
                    Some("The model returned an empty response.".to_string()),
                )
            }
            AppError::ParseError(err) => {
                tracing::error!("Model output is not valid JSON: {}", err);
                (PARSE_ERROR_MESSAGE.to_string(), Some(err.to_string()))
            }
            AppError::LlmError(msg) => {
                tracing::error!("LLM error: {}", msg);
                (INTERNAL_ERROR_MESSAGE.to_string(), Some(msg))
            }
            AppError::ConfigError(msg) => {
                tracing::error!("Config error: {}", msg);
                (INTERNAL_ERROR_MESSAGE.to_string(), Some(msg))
            }
        };

        response::error(status, message, details).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::LlmError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures of a generation call as seen from the client application.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("The generation request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        details: Option<String>,
    },

    #[error("Received invalid or incomplete quote data from API: {0}")]
    InvalidPayload(String),
}

impl GenerateError {
    /// The most specific message worth showing to the user, if any.
    ///
    /// Transport failures carry nothing the user can act on, so they yield
    /// `None` and the caller shows its localized generic text instead.
    pub fn user_message(&self) -> Option<String> {
        match self {
            GenerateError::Status { message, .. } => Some(message.clone()),
            GenerateError::InvalidPayload(_) => Some(self.to_string()),
            GenerateError::Timeout(_) | GenerateError::Network(_) => None,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            GenerateError::Status { details, .. } => details.as_deref(),
            _ => None,
        }
    }
}

/// Failures of the local key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage contains invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while sharing or copying a quote.
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("share was cancelled")]
    Cancelled,

    #[error("clipboard unavailable: {0}")]
    Clipboard(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_client_errors() {
        assert_eq!(AppError::InvalidInput("bad".into()).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn server_side_failures_are_internal_errors() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        for err in [
            AppError::MissingApiKey,
            AppError::EmptyModelOutput,
            AppError::ParseError(parse_err),
            AppError::LlmError("upstream".into()),
        ] {
            assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn server_message_is_preferred_for_status_errors() {
        let err = GenerateError::Status {
            status: 500,
            message: "Could not parse the model output.".into(),
            details: Some("expected value at line 1".into()),
        };
        assert_eq!(err.user_message().as_deref(), Some("Could not parse the model output."));
        assert_eq!(err.details(), Some("expected value at line 1"));
    }

    #[test]
    fn timeouts_defer_to_the_generic_message() {
        let err = GenerateError::Timeout(std::time::Duration::from_secs(8));
        assert!(err.user_message().is_none());
    }
}
