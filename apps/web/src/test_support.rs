//! Shared fixtures for unit tests: throwaway HTTP servers and scripted transports.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::auth::oauth::{AuthBackend, AuthError, AuthFlow, LoginPayload};
use crate::chat::conversation::UserInfo;
use crate::chat::transport::{ChatTransport, HistoryEntry, TransportError, TransportTarget};
use crate::config::Config;

pub fn test_config() -> Config {
    Config {
        ai_server_url: "http://localhost:3005".to_string(),
        chat_target: TransportTarget::PrimaryMultiTenant,
        backend_url: "http://localhost:8080".to_string(),
        google_client_id: Some("test-client.apps.googleusercontent.com".to_string()),
        public_origin: "http://localhost:8080".to_string(),
        ai_request_timeout: Duration::from_secs(5),
        port: 8080,
        rust_log: "debug".to_string(),
    }
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing listens on: connections are refused.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Transport that answers every send with the same scripted outcome and
/// records the identity each send carried.
pub struct ScriptedTransport {
    outcome: Result<Value, TransportError>,
    sent: Mutex<Vec<UserInfo>>,
}

impl ScriptedTransport {
    pub fn replying(payload: Value) -> Self {
        Self {
            outcome: Ok(payload),
            sent: Mutex::default(),
        }
    }

    pub fn failing(error: TransportError) -> Self {
        Self {
            outcome: Err(error),
            sent: Mutex::default(),
        }
    }

    pub fn sent_users(&self) -> Vec<UserInfo> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(
        &self,
        _text: &str,
        _sent_at: DateTime<Utc>,
        user: &UserInfo,
    ) -> Result<Value, TransportError> {
        self.sent.lock().unwrap().push(user.clone());
        self.outcome.clone()
    }

    async fn fetch_history(&self) -> Vec<HistoryEntry> {
        Vec::new()
    }

    async fn clear_history(&self) {}
}

/// Login backend stand-in that records every exchange it is asked to perform.
pub struct ScriptedAuthBackend {
    outcome: Result<Value, AuthError>,
    pub calls: Mutex<Vec<(AuthFlow, String)>>,
}

impl ScriptedAuthBackend {
    pub fn returning(body: Value) -> Self {
        Self {
            outcome: Ok(body),
            calls: Mutex::default(),
        }
    }

    pub fn failing(error: AuthError) -> Self {
        Self {
            outcome: Err(error),
            calls: Mutex::default(),
        }
    }
}

#[async_trait]
impl AuthBackend for ScriptedAuthBackend {
    async fn exchange_code(
        &self,
        flow: AuthFlow,
        code: &str,
        _redirect_uri: &str,
    ) -> Result<LoginPayload, AuthError> {
        self.calls.lock().unwrap().push((flow, code.to_string()));
        let body = self.outcome.clone()?;
        Ok(LoginPayload::from_reply(body).unwrap())
    }
}
