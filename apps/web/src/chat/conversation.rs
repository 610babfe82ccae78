//! Conversation log: the ordered, append-only list of entries a chat view renders.
//!
//! Insertion order is display order. Entries are never edited after they are
//! appended, with one exception: the opening greeting is reworded in place when
//! the signed-in identity changes while it is still the first entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::replies::greeting_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// Identity snapshot attached to outbound user messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: String,
}

impl UserInfo {
    /// The single identity used for every send made while nobody is signed in.
    pub fn guest() -> Self {
        Self {
            id: "guest".to_string(),
            name: "Khách".to_string(),
            email: String::new(),
            role: "GUEST".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// UUIDv7, so ids sort in creation order.
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
}

impl Message {
    fn new(text: String, sender: Sender, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            text,
            sender,
            timestamp,
            user_info: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    greeting_id: Uuid,
}

impl Conversation {
    /// Opens a conversation seeded with the assistant greeting for `identity`.
    pub fn new(identity: Option<&UserInfo>) -> Self {
        let greeting = Message::new(greeting_for(identity), Sender::Bot, Utc::now());
        Self {
            greeting_id: greeting.id,
            messages: vec![greeting],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Optimistic insert: the user's message is visible before any reply exists.
    pub fn append_user_message(&mut self, text: &str, user_info: UserInfo) -> &Message {
        let mut message = Message::new(text.to_string(), Sender::User, Utc::now());
        message.user_info = Some(user_info);
        self.push(message)
    }

    pub fn append_bot_message(&mut self, text: &str, timestamp: DateTime<Utc>) -> &Message {
        self.push(Message::new(text.to_string(), Sender::Bot, timestamp))
    }

    /// Rewords the greeting for a new identity. Only applies while the first
    /// entry is still the bot-authored greeting; returns the updated entry.
    pub fn refresh_greeting(&mut self, identity: Option<&UserInfo>) -> Option<&Message> {
        let greeting_id = self.greeting_id;
        let first = self.messages.first_mut()?;
        if first.id != greeting_id || first.sender != Sender::Bot {
            return None;
        }
        first.text = greeting_for(identity);
        Some(first)
    }

    fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }
}
