use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verba_latina::{
    api::routes::{create_router, GENERATE_PATH},
    config::Config,
    llm::GeminiClient,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (before anything else)
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verba_latina=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let server_addr = config.server_addr;
    tracing::info!(model = %config.model, "Starting server on {}", server_addr);

    let app_state = AppState {
        model: Arc::new(GeminiClient::new(config.model.clone())),
        config: Arc::new(config),
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    tracing::info!("Listening on http://{}{}", server_addr, GENERATE_PATH);
    axum::serve(listener, app).await?;

    Ok(())
}
