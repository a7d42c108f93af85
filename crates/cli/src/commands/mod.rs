//! CLI subcommand implementations and shared wiring.

pub mod chat;
pub mod doctor;
pub mod history;

use chatling_config::AppConfig;
use chatling_core::TranscriptStore;
use chatling_providers::{GeminiClient, ModelFallback};
use chatling_store::{FileStore, InMemoryStore, SheetStore};
use std::sync::Arc;

/// Build the configured transcript store.
///
/// `require_secrets()` has already run, so the sheet backend can rely on
/// its id and token being present.
pub fn build_store(config: &AppConfig) -> Arc<dyn TranscriptStore> {
    match config.store.backend.as_str() {
        "file" => {
            let path = config
                .store
                .path
                .as_ref()
                .map(std::path::PathBuf::from)
                .unwrap_or_else(FileStore::default_path);
            Arc::new(FileStore::new(path))
        }
        "memory" => Arc::new(InMemoryStore::new()),
        _ => Arc::new(SheetStore::new(
            config.store.sheet_id.clone().unwrap_or_default(),
            config.store.token.clone().unwrap_or_default(),
        )),
    }
}

/// Build the completion path: one HTTP client, primary→secondary models.
pub fn build_completion(config: &AppConfig) -> ModelFallback {
    let client = GeminiClient::new(config.api_key.clone().unwrap_or_default());
    ModelFallback::new(
        Arc::new(client),
        config.primary_model.clone(),
        config.fallback_model.clone(),
    )
}
