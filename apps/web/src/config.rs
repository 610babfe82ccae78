use std::time::Duration;

use anyhow::{Context, Result};

use crate::chat::transport::TransportTarget;

/// Application configuration loaded from environment variables.
/// Every variable has a local-development default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub ai_server_url: String,
    pub chat_target: TransportTarget,
    pub backend_url: String,
    pub google_client_id: Option<String>,
    /// Origin the browser sees, used to build the OAuth2 redirect URI.
    pub public_origin: String,
    pub ai_request_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let timeout_secs = std::env::var("AI_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("AI_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?;

        let chat_target = if parse_flag(std::env::var("USE_LEGACY_CHAT_API").ok().as_deref()) {
            TransportTarget::LegacySingleTenant
        } else {
            TransportTarget::PrimaryMultiTenant
        };

        Ok(Config {
            ai_server_url: trim_base_url(
                std::env::var("AI_SERVER_URL")
                    .unwrap_or_else(|_| "http://localhost:3005".to_string()),
            ),
            chat_target,
            backend_url: trim_base_url(
                std::env::var("BACKEND_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            ),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID")
                .ok()
                .filter(|id| !id.trim().is_empty()),
            public_origin: trim_base_url(
                std::env::var("PUBLIC_ORIGIN")
                    .unwrap_or_else(|_| format!("http://localhost:{port}")),
            ),
            ai_request_timeout: Duration::from_secs(timeout_secs),
            port,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Where Google sends the browser back after consent.
    pub fn oauth_redirect_uri(&self) -> String {
        format!("{}/auth/callback", self.public_origin)
    }
}

fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_accepts_common_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(parse_flag(Some(value)), "{value} should enable the flag");
        }
    }

    #[test]
    fn test_parse_flag_defaults_to_false() {
        assert!(!parse_flag(None));
        assert!(!parse_flag(Some("")));
        assert!(!parse_flag(Some("0")));
        assert!(!parse_flag(Some("legacy")));
    }

    #[test]
    fn test_trim_base_url_drops_trailing_slashes() {
        assert_eq!(
            trim_base_url("http://localhost:3005//".to_string()),
            "http://localhost:3005"
        );
    }

    #[test]
    fn test_oauth_redirect_uri_uses_public_origin() {
        let config = crate::test_support::test_config();
        assert_eq!(
            config.oauth_redirect_uri(),
            "http://localhost:8080/auth/callback"
        );
    }
}
