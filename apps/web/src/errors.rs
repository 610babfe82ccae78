use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::messages::{missing_config_notification, Notification};
use crate::auth::oauth::{AuthError, CallbackFailure};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] CallbackFailure),

    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, notification) = match &self {
            AppError::Auth(failure) => {
                let status = match failure.error {
                    AuthError::Provider(_) | AuthError::MissingCode => StatusCode::BAD_REQUEST,
                    AuthError::NoIdentity | AuthError::InvalidCredentials => {
                        StatusCode::UNAUTHORIZED
                    }
                    AuthError::Backend(_) => StatusCode::BAD_GATEWAY,
                };
                (status, "AUTH_FAILED", failure.notification())
            }
            AppError::MissingConfig(variable) => {
                tracing::error!("Missing configuration: {variable}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    missing_config_notification(variable),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    Notification {
                        title: "Lỗi hệ thống",
                        description: "An internal server error occurred".to_string(),
                    },
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "title": notification.title,
                "message": notification.description
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;
    use crate::auth::oauth::AuthFlow;

    async fn render(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_credentials_is_401_with_notification() {
        let (status, body) = render(AppError::Auth(CallbackFailure {
            flow: AuthFlow::Login,
            error: AuthError::InvalidCredentials,
        }))
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTH_FAILED");
        assert_eq!(body["error"]["title"], "Đăng nhập thất bại!");
    }

    #[tokio::test]
    async fn test_backend_failure_is_bad_gateway() {
        let (status, _) = render(AppError::Auth(CallbackFailure {
            flow: AuthFlow::Register,
            error: AuthError::Backend("down".to_string()),
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_missing_config_names_the_variable() {
        let (status, body) = render(AppError::MissingConfig("GOOGLE_CLIENT_ID")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"]["message"],
            "GOOGLE_CLIENT_ID chưa được cấu hình."
        );
    }
}
