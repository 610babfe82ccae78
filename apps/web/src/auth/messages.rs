// User-facing copy for sign-in notifications.
// Only two outcomes are distinguished to the user: bad credentials and everything else.

use serde::Serialize;

use crate::auth::oauth::{AuthError, AuthFlow};

pub const LOGIN_FAILED_TITLE: &str = "Đăng nhập thất bại!";
pub const REGISTER_FAILED_TITLE: &str = "Đăng ký thất bại!";
pub const MISSING_CONFIG_TITLE: &str = "Thiếu cấu hình";

pub const MISSING_CODE: &str = "Thiếu mã xác thực (code).";
pub const ACCOUNT_NOT_REGISTERED: &str = "Tài khoản Gmail này chưa được đăng ký.";
pub const ACCOUNT_NOT_CREATED: &str = "Không thể tạo tài khoản với Google.";
pub const GOOGLE_AUTH_REJECTED: &str = "Không thể xác thực với Google.";
pub const GENERIC_FAILURE: &str = "Có lỗi xảy ra, vui lòng thử lại.";

/// A toast shown by the browser page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: &'static str,
    pub description: String,
}

pub fn failure_notification(flow: AuthFlow, error: &AuthError) -> Notification {
    let title = match flow {
        AuthFlow::Login => LOGIN_FAILED_TITLE,
        AuthFlow::Register => REGISTER_FAILED_TITLE,
    };
    let description = match (error, flow) {
        (AuthError::Provider(reason), _) => reason.clone(),
        (AuthError::MissingCode, _) => MISSING_CODE.to_string(),
        (AuthError::NoIdentity, AuthFlow::Login) => ACCOUNT_NOT_REGISTERED.to_string(),
        (AuthError::NoIdentity, AuthFlow::Register) => ACCOUNT_NOT_CREATED.to_string(),
        (AuthError::InvalidCredentials, _) => GOOGLE_AUTH_REJECTED.to_string(),
        (AuthError::Backend(_), _) => GENERIC_FAILURE.to_string(),
    };
    Notification { title, description }
}

pub fn missing_config_notification(variable: &str) -> Notification {
    Notification {
        title: MISSING_CONFIG_TITLE,
        description: format!("{variable} chưa được cấu hình."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_follows_flow() {
        assert_eq!(
            failure_notification(AuthFlow::Login, &AuthError::MissingCode).title,
            LOGIN_FAILED_TITLE
        );
        assert_eq!(
            failure_notification(AuthFlow::Register, &AuthError::MissingCode).title,
            REGISTER_FAILED_TITLE
        );
    }

    #[test]
    fn test_no_identity_wording_depends_on_flow() {
        assert_eq!(
            failure_notification(AuthFlow::Login, &AuthError::NoIdentity).description,
            ACCOUNT_NOT_REGISTERED
        );
        assert_eq!(
            failure_notification(AuthFlow::Register, &AuthError::NoIdentity).description,
            ACCOUNT_NOT_CREATED
        );
    }

    #[test]
    fn test_backend_details_are_not_leaked() {
        let notification = failure_notification(
            AuthFlow::Login,
            &AuthError::Backend("status 500: stack trace".to_string()),
        );
        assert_eq!(notification.description, GENERIC_FAILURE);
    }

    #[test]
    fn test_provider_reason_is_shown() {
        let notification =
            failure_notification(AuthFlow::Login, &AuthError::Provider("access_denied".to_string()));
        assert_eq!(notification.description, "access_denied");
    }
}
