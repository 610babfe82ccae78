//! Fallback policy: what the user sees when no live reply is available.
//!
//! Runs exactly once per failed send. Nothing is retried or scheduled.

use crate::chat::replies::{canned_reply, MISCONFIGURED_ENDPOINT_REPLY, SERVICE_DEGRADED_REPLY};
use crate::chat::transport::TransportError;

/// Best-effort reply text for a failed send of `user_text`.
pub fn fallback_reply(error: &TransportError, user_text: &str) -> &'static str {
    match error {
        TransportError::ServerError(_) => SERVICE_DEGRADED_REPLY,
        TransportError::NotFound => MISCONFIGURED_ENDPOINT_REPLY,
        TransportError::Unreachable
        | TransportError::ClientError(_)
        | TransportError::MalformedResponse => canned_reply(user_text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::replies::{GENERIC_REPLY, INTERVIEW_REPLY, JOB_SEARCH_REPLY};

    #[test]
    fn test_unreachable_uses_keyword_reply() {
        assert_eq!(
            fallback_reply(&TransportError::Unreachable, "interview tips"),
            INTERVIEW_REPLY
        );
        assert_eq!(
            fallback_reply(&TransportError::Unreachable, "nothing relevant"),
            GENERIC_REPLY
        );
    }

    #[test]
    fn test_server_error_is_fixed_text_regardless_of_input() {
        for status in [500, 502, 503] {
            assert_eq!(
                fallback_reply(&TransportError::ServerError(status), "job"),
                SERVICE_DEGRADED_REPLY
            );
        }
    }

    #[test]
    fn test_not_found_reports_misconfiguration() {
        assert_eq!(
            fallback_reply(&TransportError::NotFound, "job"),
            MISCONFIGURED_ENDPOINT_REPLY
        );
    }

    #[test]
    fn test_client_error_and_malformed_reply_use_keyword_reply() {
        assert_eq!(
            fallback_reply(&TransportError::ClientError(422), "tìm việc làm"),
            JOB_SEARCH_REPLY
        );
        assert_eq!(
            fallback_reply(&TransportError::MalformedResponse, "tìm việc làm"),
            JOB_SEARCH_REPLY
        );
    }
}
