//! Chat session: the state one chat view owns, and the two-phase send.
//!
//! A send is split so the caller can render between the phases:
//! 1. `begin_send` appends the user's message right away (optimistic update).
//! 2. `dispatch` runs transport → normalizer → fallback policy. It only reads
//!    the pending send, so it can run while the view keeps handling events.
//! 3. `complete` appends the bot reply, unless the view was closed meanwhile.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chat::conversation::{Conversation, Message, UserInfo};
use crate::chat::fallback::fallback_reply;
use crate::chat::normalizer::normalize;
use crate::chat::transport::ChatTransport;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
}

/// A send whose user message is already in the log and whose reply is outstanding.
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub user_message_id: Uuid,
    pub text: String,
    pub sent_at: DateTime<Utc>,
    /// Identity at send time; later identity changes do not affect this send.
    pub user: UserInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Live,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BotReply {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub source: ReplySource,
}

pub struct ChatSession {
    conversation: Conversation,
    identity: Option<UserInfo>,
    awaiting: usize,
    open: bool,
}

impl ChatSession {
    pub fn new(identity: Option<UserInfo>) -> Self {
        Self {
            conversation: Conversation::new(identity.as_ref()),
            identity,
            awaiting: 0,
            open: true,
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting > 0
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Mirrors the send button: disabled for blank input or while a reply is pending.
    pub fn can_send(&self, input: &str) -> bool {
        self.open && !input.trim().is_empty() && !self.is_awaiting_reply()
    }

    /// Records a new signed-in identity (or sign-out) and rewords the greeting.
    /// Returns the greeting if it was updated.
    pub fn set_identity(&mut self, identity: Option<UserInfo>) -> Option<&Message> {
        self.identity = identity;
        self.conversation.refresh_greeting(self.identity.as_ref())
    }

    /// Phase 1: validates `input` and appends the user's message immediately.
    pub fn begin_send(&mut self, input: &str) -> Result<PendingSend, ChatError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let user = self.identity.clone().unwrap_or_else(UserInfo::guest);
        let message = self.conversation.append_user_message(text, user.clone());
        let pending = PendingSend {
            user_message_id: message.id,
            text: text.to_string(),
            sent_at: message.timestamp,
            user,
        };
        self.awaiting += 1;
        debug!(message_id = %pending.user_message_id, "User message appended");
        Ok(pending)
    }

    /// Phase 3: appends the bot reply. A reply that arrives after `close` is dropped.
    pub fn complete(&mut self, pending: PendingSend, reply: BotReply) -> Option<&Message> {
        self.awaiting = self.awaiting.saturating_sub(1);
        if !self.open {
            info!(
                message_id = %pending.user_message_id,
                "Chat view closed before the reply arrived; discarding it"
            );
            return None;
        }
        Some(
            self.conversation
                .append_bot_message(&reply.text, reply.timestamp),
        )
    }

    /// All three phases in sequence, for callers that do not render in between.
    #[cfg(test)]
    pub async fn send(
        &mut self,
        transport: &dyn ChatTransport,
        input: &str,
    ) -> Result<Option<&Message>, ChatError> {
        let pending = self.begin_send(input)?;
        let reply = dispatch(transport, &pending).await;
        Ok(self.complete(pending, reply))
    }

    /// Marks the view as torn down; in-flight replies will not be appended.
    pub fn close(&mut self) {
        self.open = false;
    }
}

/// Phase 2: the single suspension point of a send. Never fails: a classified
/// transport failure is turned into fallback text.
pub async fn dispatch(transport: &dyn ChatTransport, pending: &PendingSend) -> BotReply {
    let result = transport
        .send(&pending.text, pending.sent_at, &pending.user)
        .await
        .and_then(|payload| normalize(&payload, Utc::now()));

    match result {
        Ok(reply) => BotReply {
            text: reply.message,
            timestamp: reply.timestamp,
            source: ReplySource::Live,
        },
        Err(e) => {
            warn!(
                message_id = %pending.user_message_id,
                "Chat send failed ({e}); using fallback reply"
            );
            BotReply {
                text: fallback_reply(&e, &pending.text).to_string(),
                timestamp: Utc::now(),
                source: ReplySource::Fallback,
            }
        }
    }
}
