//! Model fallback — ordered primary→secondary retry over one backend.
//!
//! When the primary model fails with a retryable error, the same prompt and
//! parameters are sent exactly once to the secondary model identifier.
//! Quota and empty-response failures never reach the secondary; they
//! surface immediately so the session can answer with the matching fixed
//! reply.

use crate::classify::{classify, ErrorClass};
use chatling_core::error::CompletionError;
use chatling_core::{Completion, GenerationParams, GenerationRequest};
use std::sync::Arc;
use tracing::{info, warn};

/// A completion path with a fixed primary→secondary model order.
///
/// Constructed once at startup and reused across turns; the wrapped backend
/// owns the connection pool.
pub struct ModelFallback {
    backend: Arc<dyn Completion>,
    primary: String,
    secondary: String,
}

impl ModelFallback {
    pub fn new(
        backend: Arc<dyn Completion>,
        primary: impl Into<String>,
        secondary: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    /// The primary model identifier.
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// The secondary model identifier.
    pub fn secondary(&self) -> &str {
        &self.secondary
    }

    /// Generate text for a prompt, applying the fallback policy.
    pub async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, CompletionError> {
        let request = GenerationRequest {
            model: self.primary.clone(),
            prompt: prompt.to_string(),
            params: params.clone(),
        };

        info!(model = %self.primary, "Fallback: trying primary model");

        let primary_err = match self.backend.generate(&request).await {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        match classify(&primary_err) {
            ErrorClass::Quota => {
                warn!(
                    model = %self.primary,
                    error = %primary_err,
                    "Fallback: primary model out of quota, not retrying"
                );
                Err(primary_err)
            }
            ErrorClass::Empty => {
                warn!(
                    model = %self.primary,
                    "Fallback: primary model returned no text, not retrying"
                );
                Err(primary_err)
            }
            ErrorClass::Retryable => {
                warn!(
                    model = %self.primary,
                    error = %primary_err,
                    fallback = %self.secondary,
                    "Fallback: primary model failed, trying secondary"
                );
                let retry = GenerationRequest {
                    model: self.secondary.clone(),
                    ..request
                };
                self.backend.generate(&retry).await
            }
        }
    }

    /// Health check — delegated to the wrapped backend.
    pub async fn health_check(&self) -> Result<bool, CompletionError> {
        self.backend.health_check().await
    }
}
