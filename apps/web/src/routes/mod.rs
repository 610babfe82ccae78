pub mod health;

use axum::{routing::get, Router};

use crate::auth::handlers;
use crate::chat::ws::handle_chat_socket;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/health/connections", get(health::connections_handler))
        // Chat view (one socket per mounted view)
        .route("/chat/ws", get(handle_chat_socket))
        // Google sign-in
        .route("/auth/google", get(handlers::handle_google_start))
        .route("/auth/callback", get(handlers::handle_google_callback))
        .with_state(state)
}
