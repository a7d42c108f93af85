//! Configuration loading, validation, and management for Chatling.
//!
//! Loads configuration from `~/.chatling/config.toml` with environment
//! variable overrides. Validates all settings at startup; the secrets the
//! remote deployment needs (completion API key, sheet id, sheet token) are
//! checked before any interaction begins — missing values are a fatal
//! startup error, never discovered mid-turn.

use chatling_core::{GenerationParams, PersonaConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.chatling/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Primary model identifier
    #[serde(default = "default_primary_model")]
    pub primary_model: String,

    /// Secondary model identifier, tried once when the primary fails
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,

    /// Generation parameters (fixed per deployment)
    #[serde(default)]
    pub generation: GenerationParams,

    /// Session tuning
    #[serde(default)]
    pub session: SessionConfig,

    /// Persisted log configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Persona overrides applied onto the shipped default persona
    #[serde(default)]
    pub persona: PersonaOverrides,
}

fn default_primary_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_fallback_model() -> String {
    "gemini-2.0-flash".into()
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("primary_model", &self.primary_model)
            .field("fallback_model", &self.fallback_model)
            .field("generation", &self.generation)
            .field("session", &self.session)
            .field("store", &self.store)
            .field("persona", &self.persona)
            .finish()
    }
}

/// Session tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Context window size in messages (the last K of the transcript)
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Rows loaded from the persisted log at session start
    #[serde(default = "default_history_load")]
    pub history_load: usize,

    /// Output-token budget for the truncation-repair continuation call
    #[serde(default = "default_repair_budget")]
    pub repair_budget: u32,
}

fn default_window_size() -> usize {
    10
}
fn default_history_load() -> usize {
    15
}
fn default_repair_budget() -> u32 {
    256
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            history_load: default_history_load(),
            repair_budget: default_repair_budget(),
        }
    }
}

/// Persisted log configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend: "sheet", "file", or "memory"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// Identifier of the remote sheet (sheet backend)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,

    /// Bearer token authenticating to the sheet service (sheet backend)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Transcript file path (file backend; defaults to
    /// `~/.chatling/transcript.jsonl`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn default_store_backend() -> String {
    "sheet".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            sheet_id: None,
            token: None,
            path: None,
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("sheet_id", &self.sheet_id)
            .field("token", &redact(&self.token))
            .field("path", &self.path)
            .finish()
    }
}

/// Optional persona overrides. Unset fields keep the shipped default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_reply: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reply: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_reply: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_emoji: Option<Vec<char>>,
}

impl PersonaOverrides {
    /// Apply the overrides onto a base persona.
    pub fn apply(&self, mut base: PersonaConfig) -> PersonaConfig {
        if let Some(v) = &self.name {
            base.name = v.clone();
        }
        if let Some(v) = &self.system_prompt {
            base.system_prompt = v.clone();
        }
        if let Some(v) = &self.user_label {
            base.user_label = v.clone();
        }
        if let Some(v) = &self.assistant_label {
            base.assistant_label = v.clone();
        }
        if let Some(v) = &self.quota_reply {
            base.quota_reply = v.clone();
        }
        if let Some(v) = &self.failure_reply {
            base.failure_reply = v.clone();
        }
        if let Some(v) = &self.empty_reply {
            base.empty_reply = v.clone();
        }
        if let Some(v) = &self.terminal_emoji {
            base.terminal_emoji = v.clone();
        }
        base
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.chatling/config.toml).
    ///
    /// Environment variables override file values:
    /// - `CHATLING_API_KEY` / `GEMINI_API_KEY` — completion API key
    /// - `CHATLING_SHEET_ID` — persisted log identifier
    /// - `CHATLING_SHEET_TOKEN` — persisted log credential
    /// - `CHATLING_MODEL` — primary model identifier
    /// - `CHATLING_STORE` — store backend
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if self.api_key.is_none() {
            self.api_key = std::env::var("CHATLING_API_KEY")
                .ok()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok());
        }
        if self.store.sheet_id.is_none() {
            self.store.sheet_id = std::env::var("CHATLING_SHEET_ID").ok();
        }
        if self.store.token.is_none() {
            self.store.token = std::env::var("CHATLING_SHEET_TOKEN").ok();
        }
        if let Ok(model) = std::env::var("CHATLING_MODEL") {
            self.primary_model = model;
        }
        if let Ok(backend) = std::env::var("CHATLING_STORE") {
            self.store.backend = backend;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".chatling")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.generation.top_p) {
            return Err(ConfigError::ValidationError(
                "generation.top_p must be between 0.0 and 1.0".into(),
            ));
        }
        if self.session.window_size == 0 {
            return Err(ConfigError::ValidationError(
                "session.window_size must be at least 1".into(),
            ));
        }
        if self.generation.max_output_tokens == 0 || self.session.repair_budget == 0 {
            return Err(ConfigError::ValidationError(
                "output token budgets must be at least 1".into(),
            ));
        }
        match self.store.backend.as_str() {
            "sheet" | "file" | "memory" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown store backend: {other} (expected sheet, file, or memory)"
                )));
            }
        }
        Ok(())
    }

    /// Check that every secret the configured deployment needs is present.
    ///
    /// Called once before the session starts; a missing secret halts the
    /// process before any interaction.
    pub fn require_secrets(&self) -> Result<(), ConfigError> {
        if self.api_key.is_none() {
            return Err(ConfigError::MissingSecret {
                name: "api_key",
                hint: "CHATLING_API_KEY or GEMINI_API_KEY",
            });
        }
        if self.store.backend == "sheet" {
            if self.store.sheet_id.is_none() {
                return Err(ConfigError::MissingSecret {
                    name: "store.sheet_id",
                    hint: "CHATLING_SHEET_ID",
                });
            }
            if self.store.token.is_none() {
                return Err(ConfigError::MissingSecret {
                    name: "store.token",
                    hint: "CHATLING_SHEET_TOKEN",
                });
            }
        }
        Ok(())
    }

    /// The effective persona: shipped default plus configured overrides.
    pub fn persona(&self) -> PersonaConfig {
        self.persona.apply(PersonaConfig::default())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            primary_model: default_primary_model(),
            fallback_model: default_fallback_model(),
            generation: GenerationParams::default(),
            session: SessionConfig::default(),
            store: StoreConfig::default(),
            persona: PersonaOverrides::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required secret: {name} (set {hint} or add it to config.toml)")]
    MissingSecret {
        name: &'static str,
        hint: &'static str,
    },
}
