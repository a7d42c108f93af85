//! Message and Transcript domain types.
//!
//! These are the value objects that flow through the entire system:
//! the user submits a line → the session appends it to the transcript and
//! the persisted log → the context window is built → the completion client
//! replies → the reply is appended to both as well.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one interactive session.
///
/// Used in log output only — never persisted to the transcript store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The persona
    Assistant,
}

impl Role {
    /// The wire name of the role, as stored in the persisted log.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse a role from a persisted row cell. Unknown values yield `None`;
    /// callers skip such rows rather than failing the whole load.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a conversation.
///
/// Exactly the shape of one persisted row: a role and a content cell.
/// Immutable once created; ordering is the only relationship between
/// messages that matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,
}

impl Message {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The in-memory transcript of one interactive session.
///
/// Initialized from the most recent rows of the persisted log at session
/// start, then appended to live. Always a suffix-consistent view of the
/// log plus the current session's messages, in strict chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Unique session ID (logging only)
    pub id: SessionId,

    /// Ordered messages
    pub messages: Vec<Message>,

    /// When this session started
    pub started_at: DateTime<Utc>,
}

impl Transcript {
    /// Create a new empty transcript.
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            messages: Vec::new(),
            started_at: Utc::now(),
        }
    }

    /// Create a transcript seeded with history loaded from the persisted log.
    pub fn from_history(messages: Vec<Message>) -> Self {
        Self {
            id: SessionId::new(),
            messages,
            started_at: Utc::now(),
        }
    }

    /// Append a message to the transcript.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The last `n` messages, in chronological order. Fewer if the
    /// transcript is shorter.
    pub fn last_n(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
