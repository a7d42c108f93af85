//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chatling_core::error::StoreError;
use chatling_core::{Message, TranscriptStore};
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory transcript store backed by a Vec.
/// Nothing survives the process; useful for tests and throwaway sessions.
pub struct InMemoryStore {
    rows: Arc<RwLock<Vec<Message>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a store pre-seeded with history, for tests.
    pub fn with_history(rows: Vec<Message>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    /// A snapshot of every row, in order. Test helper.
    pub async fn snapshot(&self) -> Vec<Message> {
        self.rows.read().await.clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn load_recent(&self, n: usize) -> Result<Vec<Message>, StoreError> {
        let rows = self.rows.read().await;
        let start = rows.len().saturating_sub(n);
        Ok(rows[start..].to_vec())
    }

    async fn append(&self, message: &Message) -> Result<(), StoreError> {
        self.rows.write().await.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatling_core::Role;

    #[tokio::test]
    async fn append_and_load_roundtrip() {
        let store = InMemoryStore::new();
        store.append(&Message::user("hello")).await.unwrap();
        store.append(&Message::assistant("hi!")).await.unwrap();

        let rows = store.load_recent(10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], Message::user("hello"));
        assert_eq!(rows[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn load_recent_slices_the_tail() {
        let store = InMemoryStore::with_history(vec![
            Message::user("a"),
            Message::assistant("b"),
            Message::user("c"),
        ]);
        let rows = store.load_recent(2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].content, "b");
        assert_eq!(rows[1].content, "c");
    }

    #[tokio::test]
    async fn empty_store_loads_nothing() {
        let store = InMemoryStore::new();
        assert!(store.load_recent(15).await.unwrap().is_empty());
    }
}
