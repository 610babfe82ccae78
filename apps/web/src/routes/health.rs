use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::connection::{probe_connections, ConnectionReport};
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "recruit-chat-web"
    }))
}

/// GET /health/connections
/// Probes the AI server and the backend API on demand.
pub async fn connections_handler(State(state): State<AppState>) -> Json<ConnectionReport> {
    Json(
        probe_connections(
            &state.http,
            &state.config.ai_server_url,
            &state.config.backend_url,
        )
        .await,
    )
}
