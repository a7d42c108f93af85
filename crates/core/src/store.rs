//! TranscriptStore trait — the append-only persisted log.
//!
//! The store is the sole source of truth across sessions: an ordered
//! sequence of (role, content) rows in an external tabular resource. It is
//! never mutated or deleted by this system, only appended to — one row per
//! user message and one per assistant message, in that order, every turn.

use crate::error::StoreError;
use crate::message::Message;
use async_trait::async_trait;

/// The persisted log abstraction.
///
/// Implementations: remote sheet (HTTP), JSONL file, in-memory (testing).
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// The backend name (e.g. "sheet", "file", "in_memory").
    fn name(&self) -> &str;

    /// The last `n` rows, preserving store order. Fewer if the log is
    /// shorter. A failure here at session start is fatal for the session.
    async fn load_recent(&self, n: usize) -> std::result::Result<Vec<Message>, StoreError>;

    /// Append one row at the end of the log. Mid-turn failures are treated
    /// as best-effort by the caller: logged, never fatal to the turn.
    async fn append(&self, message: &Message) -> std::result::Result<(), StoreError>;
}
