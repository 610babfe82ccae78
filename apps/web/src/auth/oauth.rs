//! Google OAuth2 authorization-code flow.
//!
//! The backend API performs the actual code exchange with Google and issues the
//! platform's own access token. This module builds the consent URL, interprets
//! the callback query, calls the backend, and decides where the browser goes next.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::messages::{self, Notification};

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_SCOPE: &str = "openid email profile";
const REGISTER_STATE_PREFIX: &str = "register_";

const ADMIN_PATH: &str = "/admin";
const HOME_PATH: &str = "/";
const ADMIN_ROLES: &[&str] = &["ADMIN", "SUPER_ADMIN", "HR"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthFlow {
    #[default]
    Login,
    Register,
}

impl AuthFlow {
    /// The flow is carried through Google in the `state` parameter.
    pub fn from_state(state: Option<&str>) -> Self {
        match state {
            Some(s) if s.starts_with(REGISTER_STATE_PREFIX) => AuthFlow::Register,
            _ => AuthFlow::Login,
        }
    }

    pub fn new_state(self) -> String {
        let nonce = Uuid::new_v4().simple().to_string();
        match self {
            AuthFlow::Login => nonce,
            AuthFlow::Register => format!("{REGISTER_STATE_PREFIX}{nonce}"),
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            AuthFlow::Login => "login",
            AuthFlow::Register => "register",
        }
    }
}

/// Query string Google appends to the redirect URI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountId {
    Number(i64),
    Text(String),
}

/// Backends send the role either as a bare name or as `{name, permissions}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Role {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        permissions: Vec<Value>,
    },
}

impl Role {
    pub fn name(&self) -> &str {
        match self {
            Role::Name(name) | Role::Detailed { name, .. } => name,
        }
    }

    pub fn has_permissions(&self) -> bool {
        matches!(self, Role::Detailed { permissions, .. } if !permissions.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(default)]
    pub id: Option<AccountId>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Login payload returned by the backend's code exchange.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default, rename = "accessToken")]
    access_token_camel: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

impl LoginPayload {
    /// Decodes a backend login reply, with or without the `data` envelope.
    pub fn from_reply(body: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value::<LoginEnvelope>(body).map(Self::from)
    }

    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .or(self.access_token_camel.as_deref())
    }
}

/// Replies may or may not be wrapped in a `data` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoginEnvelope {
    Wrapped { data: LoginPayload },
    Direct(LoginPayload),
}

impl From<LoginEnvelope> for LoginPayload {
    fn from(envelope: LoginEnvelope) -> Self {
        match envelope {
            LoginEnvelope::Wrapped { data } => data,
            LoginEnvelope::Direct(payload) => payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("identity provider returned an error: {0}")]
    Provider(String),

    #[error("authorization code missing from callback")]
    MissingCode,

    #[error("backend returned no user for this account")]
    NoIdentity,

    #[error("backend rejected the Google credentials")]
    InvalidCredentials,

    #[error("backend error: {0}")]
    Backend(String),
}

/// The platform's login backend. Implement this to swap the HTTP exchange
/// for a scripted one in tests.
///
/// Carried in `AppState` as `Arc<dyn AuthBackend>`.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn exchange_code(
        &self,
        flow: AuthFlow,
        code: &str,
        redirect_uri: &str,
    ) -> Result<LoginPayload, AuthError>;
}

#[derive(Clone)]
pub struct HttpAuthBackend {
    client: Client,
    base_url: String,
}

impl HttpAuthBackend {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn exchange_code(
        &self,
        flow: AuthFlow,
        code: &str,
        redirect_uri: &str,
    ) -> Result<LoginPayload, AuthError> {
        let url = format!("{}/api/v1/auth/google/{}", self.base_url, flow.endpoint());
        let response = self
            .client
            .post(&url)
            .query(&[("code", code), ("redirectUri", redirect_uri)])
            .send()
            .await
            .map_err(|e| AuthError::Backend(format!("request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Backend(format!("status {status}: {body}")));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| AuthError::Backend(format!("unreadable login reply: {e}")))?;
        LoginPayload::from_reply(body)
            .map_err(|e| AuthError::Backend(format!("unexpected login reply: {e}")))
    }
}

/// Consent-screen URL the browser is sent to.
pub fn authorization_url(client_id: &str, redirect_uri: &str, state: &str) -> Result<Url> {
    Url::parse_with_params(
        GOOGLE_AUTHORIZE_URL,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", GOOGLE_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
    .context("Failed to build Google authorization URL")
}

/// Staff accounts land on the admin area, everyone else on the home page.
pub fn redirect_path(user: &AuthUser) -> &'static str {
    match &user.role {
        Some(role) if ADMIN_ROLES.contains(&role.name()) || role.has_permissions() => ADMIN_PATH,
        _ => HOME_PATH,
    }
}

#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub flow: AuthFlow,
    pub access_token: Option<String>,
    pub user: AuthUser,
    pub redirect_path: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Google {} failed: {error}", .flow.endpoint())]
pub struct CallbackFailure {
    pub flow: AuthFlow,
    pub error: AuthError,
}

impl CallbackFailure {
    pub fn notification(&self) -> Notification {
        messages::failure_notification(self.flow, &self.error)
    }
}

/// Handles the redirect back from Google. A provider error or a missing code
/// ends the flow before any backend call is made.
pub async fn complete_callback(
    params: &CallbackParams,
    backend: &dyn AuthBackend,
    redirect_uri: &str,
) -> Result<LoginSuccess, CallbackFailure> {
    let flow = AuthFlow::from_state(params.state.as_deref());
    let fail = |error: AuthError| {
        warn!(?flow, "Google callback failed: {error}");
        CallbackFailure { flow, error }
    };

    if let Some(error) = params.error.as_deref() {
        return Err(fail(AuthError::Provider(error.to_string())));
    }
    let code = params
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| fail(AuthError::MissingCode))?;

    let payload = backend
        .exchange_code(flow, code, redirect_uri)
        .await
        .map_err(fail)?;
    let access_token = payload.token().map(str::to_string);
    let user = payload.user.ok_or_else(|| fail(AuthError::NoIdentity))?;

    let redirect_path = redirect_path(&user);
    info!(?flow, email = %user.email, redirect_path, "Google sign-in completed");

    Ok(LoginSuccess {
        flow,
        access_token,
        user,
        redirect_path,
    })
}
