// Chatwork domain models.
//
// These match the v2 REST payloads so infra can decode straight into them,
// but nothing here knows about reqwest.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the contact list. The list order returned by the API is kept
/// because name matching is first-match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub account_id: u64,
    pub name: String,
    #[serde(default)]
    pub room_id: Option<u64>,
    #[serde(default)]
    pub chatwork_id: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub avatar_image_url: Option<String>,
}

impl Contact {
    pub fn new(account_id: u64, name: &str) -> Self {
        Self {
            account_id,
            name: name.to_string(),
            room_id: None,
            chatwork_id: None,
            organization_name: None,
            department: None,
            avatar_image_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageAccount {
    pub account_id: u64,
    pub name: String,
    #[serde(default)]
    pub avatar_image_url: Option<String>,
}

/// A message as returned by the room history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message_id: String,
    pub account: MessageAccount,
    pub body: String,
    pub send_time: i64,
    #[serde(default)]
    pub update_time: i64,
}

impl ChatMessage {
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.send_time, 0).single()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PostedMessage {
    #[serde(default)]
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PostedFile {
    #[serde(default)]
    pub file_id: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CreatedTasks {
    #[serde(default)]
    pub task_ids: Vec<u64>,
}

/// Deadline attached to a new task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskLimit {
    #[default]
    None,
    At(DateTime<Utc>),
}

impl TaskLimit {
    /// `limit_type` form value, plus the unix `limit` when there is one.
    pub fn form_fields(&self) -> (&'static str, Option<i64>) {
        match self {
            TaskLimit::None => ("none", None),
            TaskLimit::At(when) => ("time", Some(when.timestamp())),
        }
    }
}

/// Errors raised by the Chatwork transport.
#[derive(Debug, thiserror::Error)]
pub enum ChatworkError {
    #[error("Chatwork request failed: {0}")]
    Http(String),
    #[error("Chatwork API error ({status}): {}", errors.join(", "))]
    Api { status: u16, errors: Vec<String> },
    #[error("Unexpected Chatwork status: {0}")]
    UnexpectedStatus(u16),
    #[error("Failed to decode Chatwork response: {0}")]
    Decode(String),
    #[error("Failed to read attachment: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the messaging workflow (name resolution on top of the API).
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error(transparent)]
    Chatwork(#[from] ChatworkError),
    #[error("No contact matches '{0}'")]
    UnknownContact(String),
    #[error("A task needs at least one assignee")]
    NoAssignees,
}
