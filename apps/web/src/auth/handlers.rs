//! Axum route handlers for Google sign-in.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::auth::oauth::{authorization_url, complete_callback, AuthFlow, CallbackParams};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartParams {
    #[serde(default)]
    pub flow: AuthFlow,
}

/// GET /auth/google
///
/// Sends the browser to Google's consent screen. The flow (login or register)
/// travels through Google inside the `state` parameter.
pub async fn handle_google_start(
    State(state): State<AppState>,
    Query(params): Query<StartParams>,
) -> Result<Redirect, AppError> {
    let client_id = state
        .config
        .google_client_id
        .as_deref()
        .ok_or(AppError::MissingConfig("GOOGLE_CLIENT_ID"))?;

    let url = authorization_url(
        client_id,
        &state.config.oauth_redirect_uri(),
        &params.flow.new_state(),
    )?;

    Ok(Redirect::to(url.as_str()))
}

/// GET /auth/callback
///
/// Completes the sign-in. On success the platform token is set as a cookie and
/// the browser is redirected by role; on failure a notification is returned and
/// no redirect happens.
pub async fn handle_google_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, AppError> {
    let success = complete_callback(
        &params,
        state.auth.as_ref(),
        &state.config.oauth_redirect_uri(),
    )
    .await?;
    tracing::debug!(
        flow = ?success.flow,
        user_id = ?success.user.id,
        "Redirecting to {}",
        success.redirect_path
    );

    let redirect = Redirect::to(success.redirect_path);
    Ok(match success.access_token {
        Some(token) => ([(header::SET_COOKIE, session_cookie(&token))], redirect).into_response(),
        None => redirect.into_response(),
    })
}

fn session_cookie(token: &str) -> String {
    format!("access_token={token}; Path=/; HttpOnly; SameSite=Lax")
}
