mod auth;
mod chat;
mod config;
mod connection;
mod errors;
mod routes;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::oauth::HttpAuthBackend;
use crate::chat::transport::HttpChatTransport;
use crate::config::Config;
use crate::connection::{log_connection_report, probe_connections, upstream_client};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (malformed values abort startup)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting recruit chat web v{}", env!("CARGO_PKG_VERSION"));

    // Chat transport: one instance shared by every chat view
    let chat_transport = Arc::new(
        HttpChatTransport::new(
            &config.ai_server_url,
            config.chat_target,
            config.ai_request_timeout,
        )
        .context("Failed to build AI server client")?,
    );
    info!(
        "Chat transport initialized ({:?} at {})",
        config.chat_target, config.ai_server_url
    );

    let http = upstream_client(config.ai_request_timeout)
        .context("Failed to build upstream HTTP client")?;
    let auth = Arc::new(HttpAuthBackend::new(http.clone(), &config.backend_url));
    if config.google_client_id.is_none() {
        tracing::warn!("GOOGLE_CLIENT_ID is not set; Google sign-in is disabled");
    }

    // Startup probe is informational only
    log_connection_report(
        &probe_connections(&http, &config.ai_server_url, &config.backend_url).await,
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        chat_transport,
        auth,
        http,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to PUBLIC_ORIGIN

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
