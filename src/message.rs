//! Message records supplied by the parent chat view.
//!
//! The list never mutates these; it only reads ids, users and timestamps,
//! and serializes whole records when fingerprinting rows.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier used for both messages and users.
///
/// Chat backends disagree on whether ids are numbers or strings, so both are
/// accepted. Integer zero is a perfectly valid id.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum MessageId {
    Int(i64),
    Str(String),
}

pub type UserId = MessageId;

impl MessageId {
    /// An empty string id is treated the same as no id at all.
    pub fn is_blank(&self) -> bool {
        matches!(self, MessageId::Str(s) if s.is_empty())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Int(n) => write!(f, "{}", n),
            MessageId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for MessageId {
    fn from(n: i64) -> Self {
        MessageId::Int(n)
    }
}

impl From<i32> for MessageId {
    fn from(n: i32) -> Self {
        MessageId::Int(n.into())
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        MessageId::Str(s.to_string())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        MessageId::Str(s)
    }
}

/// The author of a message, or the local viewer.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            avatar: None,
        }
    }

    /// Name to show next to a bubble, falling back to the id.
    pub fn display_name(&self) -> String {
        match (&self.name, &self.id) {
            (Some(name), _) if !name.is_empty() => name.clone(),
            (_, Some(id)) => id.to_string(),
            _ => String::new(),
        }
    }

    /// Two users are the same person only when both carry an id and the ids match.
    pub fn same_as(&self, other: &User) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => !a.is_blank() && a == b,
            _ => false,
        }
    }
}

/// A single chat message.
///
/// Messages are ordered newest first: index 0 is the message drawn closest to
/// the composer.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// System notices ("alice joined") are drawn centered without a bubble.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub system: bool,
    /// Caller-defined fields. They take part in change detection.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    pub fn new(id: impl Into<MessageId>, text: impl Into<String>, user: User) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
            created_at: Some(Utc::now()),
            user: Some(user),
            ..Default::default()
        }
    }

    pub fn system(id: impl Into<MessageId>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
            created_at: Some(Utc::now()),
            system: true,
            ..Default::default()
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// True when the message carries no usable id.
    pub fn is_missing_id(&self) -> bool {
        self.id.as_ref().map_or(true, MessageId::is_blank)
    }
}
