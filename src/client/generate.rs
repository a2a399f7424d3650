use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::api::models::GenerateRequest;
use crate::api::response::ErrorResponse;
use crate::error::GenerateError;
use crate::quote::{Quote, QuoteData};

/// Somewhere new quotes come from.
#[async_trait]
pub trait QuoteSource {
    async fn generate_quote(&self, existing: &[Quote]) -> Result<QuoteData, GenerateError>;
}

/// HTTP client for the generation endpoint.
pub struct GenerateClient {
    http: Client,
    endpoint: String,
}

impl GenerateClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QuoteSource for GenerateClient {
    async fn generate_quote(&self, existing: &[Quote]) -> Result<QuoteData, GenerateError> {
        let res = self
            .http
            .post(&self.endpoint)
            .json(&GenerateRequest { existing_quotes: existing })
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }

        decode_quote(&body)
    }
}

/// Builds the error for a non-2xx reply, preferring the server's own message.
pub fn status_error(status: u16, body: &str) -> GenerateError {
    let fallback = format!("API request failed with status {}", status);
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => GenerateError::Status {
            status,
            message: if err.error.is_empty() { fallback } else { err.error },
            details: err.details.filter(|d| !d.is_empty()),
        },
        Err(_) => {
            tracing::error!("Could not parse error response as JSON: {}", body);
            GenerateError::Status {
                status,
                message: fallback,
                details: Some(body.to_string()).filter(|d| !d.is_empty()),
            }
        }
    }
}

/// Validates a 2xx body: it must carry a non-empty string `latin`.
pub fn decode_quote(body: &str) -> Result<QuoteData, GenerateError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| GenerateError::InvalidPayload(format!("response is not JSON ({})", e)))?;

    match value.get("latin") {
        Some(Value::String(latin)) if !latin.is_empty() => {}
        _ => return Err(GenerateError::InvalidPayload("missing Latin text".into())),
    }

    serde_json::from_value(value).map_err(|e| GenerateError::InvalidPayload(e.to_string()))
}
