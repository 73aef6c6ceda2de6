mod chat;
mod config;
mod errors;
mod llm_client;
mod normalizer;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::context::{Place, StaticContextProvider};
use crate::config::Config;
use crate::llm_client::OllamaClient;
use crate::normalizer::rules::NormalizerRules;
use crate::normalizer::ResponseNormalizer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Meetyo API v{}", env!("CARGO_PKG_VERSION"));

    let llm = OllamaClient::new(&config.ollama);
    info!(
        "Ollama client initialized (url: {}, model: {}, timeout: {}s)",
        config.ollama.base_url,
        llm.model(),
        config.ollama.timeout_secs
    );

    // Fixed place/day until a real weather source implements ContextProvider
    let place = Place::new(config.city.clone(), config.state.clone());
    info!("Context provider: static ({})", place.label());
    let context = Arc::new(StaticContextProvider::new(place, config.day.clone()));

    let mut rules = NormalizerRules::default();
    if let Some(families) = config.duplicate_tip_families.clone() {
        rules = rules.with_tip_families(families);
    }
    info!(
        "Duplicate tip families: {:?}",
        rules
            .tip_families
            .iter()
            .map(|family| family.keywords())
            .collect::<Vec<_>>()
    );
    let normalizer = Arc::new(ResponseNormalizer::new(rules));

    let state = AppState {
        llm,
        context,
        normalizer,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
