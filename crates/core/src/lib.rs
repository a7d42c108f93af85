//! # Chatling Core
//!
//! Domain types, traits, and error definitions for the Chatling persona
//! chatbot. This crate has no HTTP or runtime dependencies — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external collaborators are defined as traits here: `Completion`
//! (the hosted text-generation service) and `TranscriptStore` (the
//! append-only persisted log). Implementations live in their respective
//! crates, are constructed once at startup, and are injected into the
//! session — there is no global client state. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod completion;
pub mod error;
pub mod message;
pub mod persona;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use completion::{Completion, GenerationParams, GenerationRequest};
pub use error::{CompletionError, Error, Result, StoreError};
pub use message::{Message, Role, SessionId, Transcript};
pub use persona::PersonaConfig;
pub use store::TranscriptStore;
