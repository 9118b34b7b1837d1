use std::sync::Arc;

use reqwest::Client;

use crate::config::Config;
use crate::llm_client::TextCompleter;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; nothing here holds per-user results.
#[derive(Clone)]
pub struct AppState {
    /// Completion backend. `LlmClient` in production.
    pub completer: Arc<dyn TextCompleter>,
    /// Outbound client for job description URLs.
    pub http: Client,
    pub config: Config,
}
