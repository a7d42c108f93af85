//! Shared mocks for session tests.

use async_trait::async_trait;
use chatling_core::error::{CompletionError, StoreError};
use chatling_core::{Completion, GenerationRequest, Message, TranscriptStore};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A mock completion backend that records every request and answers from a
/// pre-loaded script.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<String, CompletionError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Result<String, CompletionError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Completion for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CompletionError::Network("script exhausted".into())))
    }
}

/// A store whose appends always fail. Loads succeed and return nothing.
pub struct FailingAppendStore;

#[async_trait]
impl TranscriptStore for FailingAppendStore {
    fn name(&self) -> &str {
        "failing_append"
    }

    async fn load_recent(&self, _n: usize) -> Result<Vec<Message>, StoreError> {
        Ok(Vec::new())
    }

    async fn append(&self, _message: &Message) -> Result<(), StoreError> {
        Err(StoreError::ApiError {
            status_code: 503,
            message: "service unavailable".into(),
        })
    }
}

/// A store that cannot even be read — models a dead connection at startup.
pub struct UnreachableStore;

#[async_trait]
impl TranscriptStore for UnreachableStore {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn load_recent(&self, _n: usize) -> Result<Vec<Message>, StoreError> {
        Err(StoreError::Connection("connection refused".into()))
    }

    async fn append(&self, _message: &Message) -> Result<(), StoreError> {
        Err(StoreError::Connection("connection refused".into()))
    }
}
