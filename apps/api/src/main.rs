mod analysis;
mod config;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::interpreter::{Interpreter, KeywordInterpreter, LlmInterpreter};
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::models::profile::load_profile;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Concierge v{}", env!("CARGO_PKG_VERSION"));

    // Profile is validated once; a bad file stops startup.
    let profile = load_profile(&config.profile_path).with_context(|| {
        format!("failed to load profile from {}", config.profile_path.display())
    })?;
    info!(
        "Profile loaded: {} skills, {} projects",
        profile.skills.len(),
        profile.projects.len()
    );

    let interpreter = build_interpreter(&config)?;
    info!(
        "Interpreter: {} (enabled: {}, budget: {}ms)",
        interpreter.name(),
        config.ai.enabled,
        config.ai.timeout.as_millis()
    );

    let state = AppState {
        profile: Arc::new(profile),
        config: config.clone(),
        interpreter,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// LlmInterpreter when AI is enabled and keyed, KeywordInterpreter otherwise.
fn build_interpreter(config: &Config) -> Result<Arc<dyn Interpreter>> {
    let ai = &config.ai;
    match (&ai.api_key, ai.is_active()) {
        (Some(api_key), true) => {
            let llm = LlmClient::new(api_key.clone(), ai.model_id.clone(), ai.timeout)
                .context("failed to build LLM client")?;
            info!("LLM client initialized (model: {})", llm.model());
            Ok(Arc::new(LlmInterpreter::new(llm)))
        }
        _ => {
            if ai.enabled {
                warn!("AI_ENABLED is set but ANTHROPIC_API_KEY is missing; using keyword interpreter");
            }
            Ok(Arc::new(KeywordInterpreter))
        }
    }
}
