//! WhistleChain Server
//!
//! Anonymous report submission API. Reports are fingerprinted with SHA-256
//! on arrival and kept in memory, PostgreSQL or SQLite depending on
//! configuration.

mod config;
mod error;
mod handlers;
mod storage;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use whistle_core::ReportStore;

use crate::config::ServerConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReportStore>,
    pub fingerprint_reports: bool,
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting WhistleChain Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = ServerConfig::load().context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}:{}, store={}, fingerprint={}",
        config.host,
        config.port,
        config.store_kind(),
        config.fingerprint_reports
    );

    let store = storage::connect(&config)
        .await
        .context("Failed to initialize report store")?;
    info!("Report store initialized: {}", store.backend());

    let state = AppState {
        store,
        fingerprint_reports: config.fingerprint_reports,
    };
    let app = router(state);

    let addr = config.bind_address().await?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server running on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Build the HTTP router over `state`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/report", post(handlers::reports::submit))
        .route("/reports", get(handlers::reports::list))
        .route("/report/:id", get(handlers::reports::get))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
