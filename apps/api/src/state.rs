use std::sync::Arc;

use crate::chat::context::ContextProvider;
use crate::llm_client::OllamaClient;
use crate::normalizer::ResponseNormalizer;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is immutable; requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    pub llm: OllamaClient,
    /// Pluggable context source. Default: StaticContextProvider from config.
    pub context: Arc<dyn ContextProvider>,
    /// Compiled once at startup.
    pub normalizer: Arc<ResponseNormalizer>,
}
