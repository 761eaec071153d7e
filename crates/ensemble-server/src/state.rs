//! Shared application state

use ensemble_core::CharacterSandbox;
use std::sync::Arc;

/// State handed to every request handler. Holds no conversation data.
#[derive(Clone)]
pub struct AppState {
    pub sandbox: Arc<CharacterSandbox>,
}

impl AppState {
    pub fn new(sandbox: CharacterSandbox) -> Self {
        Self {
            sandbox: Arc::new(sandbox),
        }
    }
}
