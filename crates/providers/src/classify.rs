//! Error classification for the fallback policy.
//!
//! The quota-vs-other split drives user-facing messaging and is decided by
//! matching substrings in the error's rendered message. That is fragile by
//! nature, so the matching rules live in this one function and nowhere
//! else.

use chatling_core::error::CompletionError;

/// How the fallback policy treats a completion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Quota/rate-limit exhaustion. The secondary model is never attempted;
    /// the session answers with the persona's quota reply.
    Quota,
    /// The service answered but produced no text. Not retried; the session
    /// answers with the persona's ask-again reply.
    Empty,
    /// Anything else — worth exactly one attempt against the secondary model.
    Retryable,
}

/// Substrings that mark a quota/rate-limit failure in rendered error text.
const QUOTA_MARKERS: [&str; 5] = ["quota", "resource_exhausted", "429", "exceeded", "limit"];

/// Classify a completion failure.
///
/// Structural rate-limit errors classify as quota directly; everything else
/// falls back to case-insensitive keyword matching on the display message.
pub fn classify(error: &CompletionError) -> ErrorClass {
    match error {
        CompletionError::RateLimited(_) => ErrorClass::Quota,
        CompletionError::EmptyResponse => ErrorClass::Empty,
        other => {
            let message = other.to_string().to_lowercase();
            if QUOTA_MARKERS.iter().any(|marker| message.contains(marker)) {
                ErrorClass::Quota
            } else {
                ErrorClass::Retryable
            }
        }
    }
}
