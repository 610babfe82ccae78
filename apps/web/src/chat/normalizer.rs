//! Response normalizer: turns whatever the AI server sent back into one
//! canonical `{message, timestamp}` pair.
//!
//! Accepted reply shapes, tried in order:
//! 1. nested  `{"data": {"message" | "response": .., "timestamp": ..}}`
//! 2. flat    `{"message" | "response": .., "timestamp": ..}`
//! 3. bare    `".."`
//!
//! Anything else is `MalformedResponse`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::chat::transport::TransportError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalReply {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplyShape {
    Nested,
    Flat,
    Bare,
}

#[derive(Debug, Deserialize)]
struct ReplyBody {
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    response: Option<Value>,
    #[serde(default)]
    timestamp: Option<Value>,
}

impl ReplyBody {
    /// `message` wins over `response`; blank strings count as absent.
    fn text(&self) -> Option<String> {
        [&self.message, &self.response]
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .find(|s| !s.trim().is_empty())
            .map(str::to_string)
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    data: ReplyBody,
}

/// One decoded server reply, tagged with the shape it arrived in.
#[derive(Debug)]
enum ServerReply {
    Nested(ReplyBody),
    Flat(ReplyBody),
    Bare(String),
}

impl ServerReply {
    fn decode(payload: &Value) -> Option<Self> {
        match payload {
            Value::String(s) if !s.trim().is_empty() => Some(ServerReply::Bare(s.clone())),
            Value::Object(_) => {
                if let Ok(envelope) = Envelope::deserialize(payload) {
                    if envelope.data.text().is_some() {
                        return Some(ServerReply::Nested(envelope.data));
                    }
                }
                ReplyBody::deserialize(payload)
                    .ok()
                    .filter(|body| body.text().is_some())
                    .map(ServerReply::Flat)
            }
            _ => None,
        }
    }

    fn shape(&self) -> ReplyShape {
        match self {
            ServerReply::Nested(_) => ReplyShape::Nested,
            ServerReply::Flat(_) => ReplyShape::Flat,
            ServerReply::Bare(_) => ReplyShape::Bare,
        }
    }

    fn into_canonical(self, received_at: DateTime<Utc>) -> Option<CanonicalReply> {
        match self {
            ServerReply::Nested(body) | ServerReply::Flat(body) => Some(CanonicalReply {
                message: body.text()?,
                timestamp: body.timestamp().unwrap_or(received_at),
            }),
            ServerReply::Bare(message) => Some(CanonicalReply {
                message,
                timestamp: received_at,
            }),
        }
    }
}

/// Decodes `payload` into a canonical reply. A missing or unparseable
/// timestamp defaults to `received_at`.
pub fn normalize(
    payload: &Value,
    received_at: DateTime<Utc>,
) -> Result<CanonicalReply, TransportError> {
    ServerReply::decode(payload)
        .and_then(|reply| {
            debug!(shape = ?reply.shape(), "Decoded AI server reply");
            reply.into_canonical(received_at)
        })
        .ok_or_else(|| {
            warn!("Unrecognized AI server reply shape: {payload}");
            TransportError::MalformedResponse
        })
}
