//! Error types for ensemble-core

use thiserror::Error;

/// Result type alias using ensemble-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while orchestrating a conversation
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the inference client
    #[error(transparent)]
    Ai(#[from] ensemble_ai::Error),

    /// The conversation has no AI participant who could speak
    #[error("No eligible speaker: conversation has no AI participants")]
    NoEligibleSpeaker,

    /// The submitted conversation breaks a structural invariant
    #[error("Invalid conversation: {0}")]
    InvalidConversation(String),

    /// The request parameters are out of range
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A generated name is already taken in the cast
    #[error("Generated name '{0}' is already taken")]
    DuplicateName(String),

    /// Post-processing left nothing usable from the model output
    #[error("Model returned an empty {0}")]
    EmptyGeneration(&'static str),
}

impl Error {
    /// Whether the caller sent something malformed, as opposed to a server-side failure
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidConversation(_) | Error::InvalidRequest(_)
        )
    }
}
