mod ai;
mod config;
mod documents;
mod errors;
mod models;
mod normalize;
mod pdf;
mod routes;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, EnvFilter};

use crate::ai::{AiAssistant, ChatClient};
use crate::config::Config;
use crate::documents::DocumentPipeline;
use crate::routes::{build_router, AppState};
use crate::templates::TemplateStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Config first: a missing AI key stops the process before anything else starts
    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log));
    fmt().with_env_filter(filter).init();

    let templates = TemplateStore::builtin();
    tracing::info!("📄 {} templates available", templates.ids().count());

    let exporter = pdf::build_exporter(&config.export);
    match exporter.ensure_available() {
        Ok(()) => tracing::info!("🖨️ PDF exporter: {}", exporter.name()),
        Err(e) => tracing::warn!("⚠️ PDF exporter '{}' unavailable, /generate will fail: {}", exporter.name(), e),
    }

    let key_preview: String = config.ai_api_key.chars().take(6).collect();
    tracing::info!("Using AI model {} at {} (key {}...)", config.ai_model, config.ai_api_base, key_preview);
    let chat = ChatClient::new(
        config.ai_api_key.clone(),
        &config.ai_api_base,
        config.ai_model.clone(),
        config.ai_timeout,
    )
    .context("failed to build AI client")?;

    let state = AppState {
        documents: DocumentPipeline::new(Arc::new(templates), exporter),
        assistant: Arc::new(AiAssistant::new(Arc::new(chat))),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
