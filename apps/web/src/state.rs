use std::sync::Arc;

use reqwest::Client;

use crate::auth::oauth::AuthBackend;
use crate::chat::transport::ChatTransport;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no conversation data: each chat view owns its own log.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable chat transport. Default: `HttpChatTransport` against the configured target.
    pub chat_transport: Arc<dyn ChatTransport>,
    /// Pluggable login backend. Default: `HttpAuthBackend`.
    pub auth: Arc<dyn AuthBackend>,
    /// Plain client for health probes.
    pub http: Client,
}
