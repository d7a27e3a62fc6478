//! Chat transcript and JSON export format

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Server-side limit on a single chat message.
pub const MAX_MESSAGE_LEN: usize = 1000;

/// Reply used when the assistant request fails.
pub const FALLBACK_BOT_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self::at(sender, text, Utc::now())
    }

    pub fn at(sender: Sender, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            timestamp,
        }
    }
}

/// Validate and trim an outgoing chat message.
pub fn prepare_message(input: &str) -> Result<String, DomainError> {
    let message = input.trim();
    if message.is_empty() {
        return Err(DomainError::EmptyField("message"));
    }
    let len = message.chars().count();
    if len > MAX_MESSAGE_LEN {
        return Err(DomainError::MessageTooLong {
            len,
            max: MAX_MESSAGE_LEN,
        });
    }
    Ok(message.to_string())
}

/// Stored exchange as returned by `/chat/history/{tree_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HistoryEntry {
    /// Expand one stored exchange into the user prompt and the bot reply.
    ///
    /// Unparseable timestamps fall back to `now`.
    pub fn into_messages(self, now: DateTime<Utc>) -> Vec<ChatMessage> {
        let timestamp = self
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(now);

        let mut messages = Vec::with_capacity(2);
        if let Some(text) = self.message.filter(|t| !t.is_empty()) {
            messages.push(ChatMessage::at(Sender::User, text, timestamp));
        }
        if let Some(text) = self.response.filter(|t| !t.is_empty()) {
            messages.push(ChatMessage::at(Sender::Bot, text, timestamp));
        }
        messages
    }
}

/// RFC 3339, or a naive ISO timestamp taken as UTC.
fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Reply of `POST /chat`; older servers answer with `message` instead of `response`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatReply {
    pub fn text(self) -> String {
        self.response
            .or(self.message)
            .unwrap_or_else(|| FALLBACK_BOT_REPLY.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedMessage {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Exported chat file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatExport {
    pub tree: String,
    #[serde(rename = "exportedAt")]
    pub exported_at: DateTime<Utc>,
    pub messages: Vec<ExportedMessage>,
}

impl ChatExport {
    pub fn new(tree: &str, messages: &[ChatMessage]) -> Result<Self, DomainError> {
        if messages.is_empty() {
            return Err(DomainError::NoMessages);
        }
        let tree = if tree.trim().is_empty() {
            "Unknown Tree".to_string()
        } else {
            tree.to_string()
        };
        Ok(Self {
            tree,
            exported_at: Utc::now(),
            messages: messages
                .iter()
                .map(|m| ExportedMessage {
                    sender: m.sender,
                    text: m.text.clone(),
                    timestamp: m.timestamp,
                })
                .collect(),
        })
    }

    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string_pretty(self).map_err(|e| DomainError::InvalidExport(e.to_string()))
    }

    pub fn from_json(content: &str) -> Result<Self, DomainError> {
        serde_json::from_str(content).map_err(|e| DomainError::InvalidExport(e.to_string()))
    }

    /// Default file name for an export taken at `exported_at`.
    pub fn file_name(&self) -> String {
        format!("chat-export-{}.json", self.exported_at.timestamp_millis())
    }
}
