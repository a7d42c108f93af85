//! File store — JSONL persisted log for local development.
//!
//! One JSON-encoded message per line. Strictly append-only: rows are only
//! ever added to the end of the file, matching the remote store's contract.
//! Existing rows are loaded once at construction and served from memory.
//!
//! Storage location: `~/.chatling/transcript.jsonl`

use async_trait::async_trait;
use chatling_core::error::StoreError;
use chatling_core::{Message, TranscriptStore};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A file-backed transcript store using JSONL (one JSON object per line).
pub struct FileStore {
    path: PathBuf,
    rows: Arc<RwLock<Vec<Message>>>,
}

impl FileStore {
    /// Create a file store at the given path.
    ///
    /// If the file exists, rows are loaded from it.
    /// If it does not, the log starts empty (file created on first append).
    pub fn new(path: PathBuf) -> Self {
        let rows = Self::load_from_disk(&path);
        debug!(path = %path.display(), rows = rows.len(), "File transcript store loaded");
        Self {
            path,
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    /// Default path: `~/.chatling/transcript.jsonl`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".chatling").join("transcript.jsonl")
    }

    /// Load rows from a JSONL file, skipping lines that do not parse.
    fn load_from_disk(path: &PathBuf) -> Vec<Message> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(), // File doesn't exist yet — start empty
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<Message>(line) {
                Ok(message) => Some(message),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted transcript row");
                    None
                }
            })
            .collect()
    }

    /// Append one line to the end of the file, creating it if needed.
    fn append_to_disk(&self, message: &Message) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create transcript directory: {e}"))
            })?;
        }

        let line = serde_json::to_string(message)
            .map_err(|e| StoreError::Storage(format!("Failed to serialize row: {e}")))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::Storage(format!("Failed to open transcript file: {e}")))?;

        writeln!(file, "{line}")
            .map_err(|e| StoreError::Storage(format!("Failed to write transcript row: {e}")))
    }
}

#[async_trait]
impl TranscriptStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn load_recent(&self, n: usize) -> Result<Vec<Message>, StoreError> {
        let rows = self.rows.read().await;
        let start = rows.len().saturating_sub(n);
        Ok(rows[start..].to_vec())
    }

    async fn append(&self, message: &Message) -> Result<(), StoreError> {
        self.append_to_disk(message)?;
        self.rows.write().await.push(message.clone());
        Ok(())
    }
}
