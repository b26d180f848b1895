//! Chat Responder - WhatsApp webhook conversational bot
//!
//! Receives message notifications, runs each sender's text through a
//! small conversation state machine and replies via the Cloud API.

mod api;
mod config;
mod dialogue;
mod gateway;

use api::{create_router, AppState};
use config::GatewayConfig;
use dialogue::{DialogueEngine, MemoryStateStore, RandomGreeting};
use gateway::WhatsAppSender;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; real deployments set the environment directly
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_responder=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(config = ?config, "Configuration loaded");
    if config.app_secret.is_none() {
        tracing::warn!("APP_SECRET not set; webhook signatures will not be verified");
    }

    // Conversation state
    let store = Arc::new(MemoryStateStore::new());
    if let Some(ttl) = config.state_idle_ttl {
        spawn_eviction(Arc::clone(&store), ttl);
    }
    let engine = DialogueEngine::new(Arc::clone(&store), RandomGreeting);

    // Outbound delivery
    let sender = Arc::new(WhatsAppSender::new(&config)?);

    let port = config.port;
    let state = AppState::new(engine, sender, config);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Chat responder listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Periodically drop senders that have been quiet for longer than `ttl`
fn spawn_eviction(store: Arc<MemoryStateStore>, ttl: Duration) {
    let period = (ttl / 4).max(Duration::from_secs(1));
    tracing::info!(ttl_secs = ttl.as_secs(), "Idle conversation eviction enabled");

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let evicted = store.evict_idle(ttl);
            if evicted > 0 {
                tracing::info!(evicted, remaining = store.len(), "Evicted idle conversations");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
