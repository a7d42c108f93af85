//! Completion client implementations for Chatling.
//!
//! The HTTP backend implements the `chatling_core::Completion` trait.
//! `ModelFallback` wraps one backend with the primary→secondary model retry
//! policy; `classify` is the single place the quota-vs-other split lives.

pub mod classify;
pub mod fallback;
pub mod gemini;

pub use classify::{classify, ErrorClass};
pub use fallback::ModelFallback;
pub use gemini::GeminiClient;
