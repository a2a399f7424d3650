pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod quote;

use std::sync::Arc;
use config::Config;
use llm::QuoteModel;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub model: Arc<dyn QuoteModel>,
}
