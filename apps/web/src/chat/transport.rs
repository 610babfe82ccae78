//! Chat transport: the single point of entry for calls to the AI server's chat API.
//!
//! One outbound request per send, no retry. Failures are classified so the
//! fallback policy can decide what the user sees. The target (primary
//! multi-tenant or legacy single-tenant) is fixed by configuration.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::chat::conversation::UserInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportTarget {
    PrimaryMultiTenant,
    LegacySingleTenant,
}

impl TransportTarget {
    fn send_path(self) -> &'static str {
        match self {
            TransportTarget::PrimaryMultiTenant => "/api/v1/chat/send",
            TransportTarget::LegacySingleTenant => "/api/chat",
        }
    }

    fn history_path(self) -> &'static str {
        match self {
            TransportTarget::PrimaryMultiTenant => "/api/v1/chat/history",
            TransportTarget::LegacySingleTenant => "/api/chat/history",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("AI server unreachable")]
    Unreachable,

    #[error("AI server error (status {0})")]
    ServerError(u16),

    #[error("chat endpoint not found")]
    NotFound,

    #[error("AI server rejected the request (status {0})")]
    ClientError(u16),

    #[error("AI server reply is not in a recognized shape")]
    MalformedResponse,
}

impl TransportError {
    fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            404 => TransportError::NotFound,
            code if code >= 500 => TransportError::ServerError(code),
            code => TransportError::ClientError(code),
        }
    }
}

/// A past exchange as stored by the AI server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    pub sender: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// The chat backend seen by a view. Implement this to swap the HTTP adapter
/// for another target or a scripted stand-in.
///
/// Carried in `AppState` as `Arc<dyn ChatTransport>`.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Issues one send and returns the raw reply payload.
    async fn send(
        &self,
        text: &str,
        sent_at: DateTime<Utc>,
        user: &UserInfo,
    ) -> Result<Value, TransportError>;

    /// Best-effort; failures are logged and produce an empty list.
    async fn fetch_history(&self) -> Vec<HistoryEntry>;

    /// Best-effort; failures are logged and swallowed.
    async fn clear_history(&self);
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: &'a str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a UserInfo>,
}

#[derive(Clone)]
pub struct HttpChatTransport {
    client: Client,
    base_url: String,
    target: TransportTarget,
}

impl HttpChatTransport {
    pub fn new(
        base_url: &str,
        target: TransportTarget,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            target,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(
        &self,
        text: &str,
        sent_at: DateTime<Utc>,
        user: &UserInfo,
    ) -> Result<Value, TransportError> {
        // The legacy server is single-tenant and never sees identity data.
        let user = match self.target {
            TransportTarget::PrimaryMultiTenant => Some(user),
            TransportTarget::LegacySingleTenant => None,
        };
        let body = SendRequest {
            message: text,
            timestamp: sent_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            user,
        };

        let response = self
            .client
            .post(self.url(self.target.send_path()))
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("AI server: network error, server unreachable: {e}");
                TransportError::Unreachable
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            match status.as_u16() {
                401 => error!("AI server: unauthorized access"),
                403 => error!("AI server: forbidden, no permission for this endpoint"),
                404 => error!("AI server: endpoint not found"),
                429 => error!("AI server: rate limit exceeded"),
                _ => error!("AI server: error {status}: {body}"),
            }
            return Err(TransportError::from_status(status));
        }

        let raw = response.text().await.map_err(|e| {
            warn!("AI server: failed to read reply body: {e}");
            TransportError::MalformedResponse
        })?;

        debug!(status = status.as_u16(), bytes = raw.len(), "AI server replied");

        // Plain-text bodies are handed on as a bare string payload.
        Ok(serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
    }

    async fn fetch_history(&self) -> Vec<HistoryEntry> {
        let result = async {
            self.client
                .get(self.url(self.target.history_path()))
                .header(header::ACCEPT, "application/json")
                .send()
                .await?
                .error_for_status()?
                .json::<Vec<HistoryEntry>>()
                .await
        }
        .await;

        result.unwrap_or_else(|e| {
            warn!("Error fetching chat history: {e}");
            Vec::new()
        })
    }

    async fn clear_history(&self) {
        let result = self
            .client
            .delete(self.url(self.target.history_path()))
            .send()
            .await
            .and_then(|r| r.error_for_status());

        if let Err(e) = result {
            warn!("Error clearing chat history: {e}");
        }
    }
}
