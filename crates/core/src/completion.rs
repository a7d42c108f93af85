//! Completion trait — the abstraction over the text-generation service.
//!
//! A `Completion` backend knows how to turn a rendered prompt into generated
//! text for a given model identifier. The session never talks to a backend
//! directly; it goes through the model-fallback wrapper in
//! `chatling-providers`.

use crate::error::CompletionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling and budget parameters for generation.
///
/// Fixed per deployment; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Temperature (0.0 = deterministic, higher = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling cutoff
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Number of candidates to request (only the first is used)
    #[serde(default = "default_candidate_count")]
    pub candidate_count: u32,
}

fn default_temperature() -> f32 {
    0.85
}
fn default_top_p() -> f32 {
    0.95
}
fn default_max_output_tokens() -> u32 {
    1000
}
fn default_candidate_count() -> u32 {
    1
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
            candidate_count: default_candidate_count(),
        }
    }
}

impl GenerationParams {
    /// The same parameters with a smaller output budget, for the one-shot
    /// truncation-repair continuation call.
    pub fn with_output_budget(&self, max_output_tokens: u32) -> Self {
        Self {
            max_output_tokens,
            ..self.clone()
        }
    }
}

/// One request to a text-generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The model identifier (e.g. "gemini-2.5-flash")
    pub model: String,

    /// The fully rendered prompt (persona text + history window)
    pub prompt: String,

    /// Sampling parameters
    pub params: GenerationParams,
}

/// The core Completion trait.
///
/// The session calls `generate()` without knowing which backend is being
/// used — pure polymorphism, and the seam where tests inject mocks.
#[async_trait]
pub trait Completion: Send + Sync {
    /// A human-readable name for this backend (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate text for the request. Whitespace-only output is an error
    /// (`CompletionError::EmptyResponse`), never an empty success.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<String, CompletionError>;

    /// Health check — can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, CompletionError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_defaults() {
        let params = GenerationParams::default();
        assert!((params.temperature - 0.85).abs() < f32::EPSILON);
        assert!((params.top_p - 0.95).abs() < f32::EPSILON);
        assert_eq!(params.max_output_tokens, 1000);
        assert_eq!(params.candidate_count, 1);
    }

    #[test]
    fn output_budget_override_keeps_sampling() {
        let params = GenerationParams::default();
        let repair = params.with_output_budget(256);
        assert_eq!(repair.max_output_tokens, 256);
        assert!((repair.temperature - params.temperature).abs() < f32::EPSILON);
        assert_eq!(repair.candidate_count, params.candidate_count);
    }

    #[test]
    fn request_serialization() {
        let req = GenerationRequest {
            model: "gemini-2.5-flash".into(),
            prompt: "hello".into(),
            params: GenerationParams::default(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("gemini-2.5-flash"));
        let parsed: GenerationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.model, req.model);
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: GenerationParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.max_output_tokens, 1000);
    }
}
