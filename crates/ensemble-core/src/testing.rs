//! Scripted inference client for unit tests

use std::sync::Arc;

use async_trait::async_trait;
use ensemble_ai::{ChatRequest, InferenceClient};
use parking_lot::Mutex;

type Handler = Box<dyn Fn(&ChatRequest) -> ensemble_ai::Result<String> + Send + Sync>;

/// Answers every request through a closure and records what it was sent.
pub(crate) struct ScriptedClient {
    handler: Handler,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    pub(crate) fn new(
        handler: impl Fn(&ChatRequest) -> ensemble_ai::Result<String> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn replying(text: &'static str) -> Arc<Self> {
        Self::new(move |_| Ok(text.to_string()))
    }

    pub(crate) fn failing() -> Arc<Self> {
        Self::new(|_| Err(ensemble_ai::Error::RateLimited { retry_after: None }))
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn invoke(&self, request: &ChatRequest) -> ensemble_ai::Result<String> {
        self.requests.lock().push(request.clone());
        (self.handler)(request)
    }
}

/// Whether a generation request asks for a name (as opposed to a backstory)
pub(crate) fn is_name_request(request: &ChatRequest) -> bool {
    request
        .chat_history
        .last()
        .is_some_and(|m| m.message.contains("first name and last name"))
}
