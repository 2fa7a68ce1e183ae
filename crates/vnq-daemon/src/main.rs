//! vnq-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, reads config, builds
//! the shared state, wires middleware, and starts the HTTP server. Route
//! handlers live in `routes.rs`; config parsing lives in `config.rs`.

use std::sync::Arc;

use anyhow::Context;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};
use vnq_daemon::{config::DaemonConfig, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local if present (dev convenience).
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cfg = DaemonConfig::from_env().context("invalid daemon config")?;
    let source = cfg.build_source()?;
    info!(
        source = source.source_name(),
        cors_origin = ?cfg.cors_origin,
        "config loaded"
    );

    let shared = Arc::new(AppState::new(source));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cfg.cors_layer());

    info!(
        version = shared.build.version,
        "{} listening on http://{}",
        shared.build.service,
        cfg.addr
    );

    let listener = tokio::net::TcpListener::bind(cfg.addr)
        .await
        .with_context(|| format!("bind {}", cfg.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
