//! Upstream reachability probe for the AI server and the backend API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub ai_server: bool,
    pub backend: bool,
    pub ai_server_url: String,
    pub backend_url: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct HealthReply {
    #[serde(default)]
    success: bool,
}

/// Client shared by the probe and the login backend; every request is bounded by `timeout`.
pub fn upstream_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

/// Checks both upstreams once. Never fails; problems are collected in `errors`.
pub async fn probe_connections(
    client: &Client,
    ai_server_url: &str,
    backend_url: &str,
) -> ConnectionReport {
    let mut errors = Vec::new();

    let ai_server = match client.get(format!("{ai_server_url}/api/health")).send().await {
        Ok(response) => match response.json::<HealthReply>().await {
            Ok(reply) if reply.success => true,
            _ => {
                errors.push("AI Server returned unsuccessful response".to_string());
                false
            }
        },
        Err(e) => {
            errors.push(format!("AI Server connection failed: {e}"));
            false
        }
    };

    // 401 still proves the backend is up.
    let backend = match client
        .get(format!("{backend_url}/api/v1/auth/account"))
        .send()
        .await
    {
        Ok(response)
            if response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED =>
        {
            true
        }
        Ok(response) => {
            errors.push(format!("Backend returned status: {}", response.status()));
            false
        }
        Err(e) => {
            errors.push(format!("Backend connection failed: {e}"));
            false
        }
    };

    ConnectionReport {
        ai_server,
        backend,
        ai_server_url: ai_server_url.to_string(),
        backend_url: backend_url.to_string(),
        errors,
    }
}

pub fn log_connection_report(report: &ConnectionReport) {
    let status = |ok: bool| if ok { "connected" } else { "failed" };
    info!(
        "AI Server ({}): {}",
        report.ai_server_url,
        status(report.ai_server)
    );
    info!("Backend ({}): {}", report.backend_url, status(report.backend));
    for e in &report.errors {
        error!("{e}");
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode as AxumStatus, routing::get, Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;
    use crate::test_support::{spawn_server, unreachable_base_url};

    #[tokio::test]
    async fn test_both_upstreams_healthy() {
        let ai = spawn_server(Router::new().route(
            "/api/health",
            get(|| async { Json(json!({ "success": true })) }),
        ))
        .await;
        let backend = spawn_server(Router::new().route(
            "/api/v1/auth/account",
            get(|| async { AxumStatus::UNAUTHORIZED }),
        ))
        .await;

        let report = probe_connections(&Client::new(), &ai, &backend).await;

        assert!(report.ai_server);
        assert!(report.backend);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_unsuccessful_health_and_backend_error_are_reported() {
        let ai = spawn_server(Router::new().route(
            "/api/health",
            get(|| async { Json(json!({ "success": false })) }),
        ))
        .await;
        let backend = spawn_server(Router::new().route(
            "/api/v1/auth/account",
            get(|| async { AxumStatus::INTERNAL_SERVER_ERROR }),
        ))
        .await;

        let report = probe_connections(&Client::new(), &ai, &backend).await;

        assert!(!report.ai_server);
        assert!(!report.backend);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[1].contains("500"));
    }

    #[tokio::test]
    async fn test_unreachable_upstreams() {
        let url = unreachable_base_url().await;
        let report = probe_connections(&Client::new(), &url, &url).await;
        assert!(!report.ai_server && !report.backend);
        assert!(report.errors[0].starts_with("AI Server connection failed"));
    }

    #[tokio::test]
    async fn test_silent_upstream_times_out_with_error() {
        // Accepts connections and never writes a byte back.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });
        let client = upstream_client(Duration::from_millis(200)).unwrap();

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            probe_connections(&client, &url, &url),
        )
        .await
        .expect("probe must finish once the client timeout fires");

        assert!(!report.ai_server && !report.backend);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].starts_with("AI Server connection failed"));
        assert!(report.errors[1].starts_with("Backend connection failed"));
    }
}
