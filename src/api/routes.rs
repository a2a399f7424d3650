use axum::{
    body::Bytes,
    extract::{Json, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::models::{existing_latin, parse_model_output};
use crate::error::{AppError, Result};
use crate::llm::build_prompt;
use crate::AppState;

pub const GENERATE_PATH: &str = "/api/generate";

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route(GENERATE_PATH, post(generate_handler).fallback(method_not_allowed))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn method_not_allowed(method: Method) -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        format!("Method {} Not Allowed", method),
    )
}

async fn generate_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let start_time = std::time::Instant::now();

    let api_key = state.config.api_key.as_deref().ok_or(AppError::MissingApiKey)?;

    let body: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidInput(format!("Request body must be a JSON object: {}", e)))?;
    let existing = existing_latin(&body)?;
    tracing::info!(existing = existing.len(), "Generating a new quote");

    let prompt = build_prompt(&existing);

    let raw = tokio::time::timeout(state.config.model_timeout, state.model.generate(api_key, &prompt))
        .await
        .map_err(|_| {
            AppError::LlmError(format!(
                "The model did not answer within {:?}",
                state.config.model_timeout
            ))
        })??;
    tracing::info!("Model call took {:?}", start_time.elapsed());

    let quote = parse_model_output(&raw)?;
    let latin = quote.get("latin").and_then(|latin| latin.as_str()).unwrap_or_default();
    tracing::info!(latin, "Generated quote");

    Ok(Json(quote))
}
