//! ensemble-core: turn-taking and character generation
//!
//! This crate holds the conversation model and the logic that drives it:
//! choosing the next speaker, generating a cast of characters concurrently,
//! and cleaning model output into names and utterances.

pub mod conversation;
pub mod error;
pub mod generator;
pub mod postprocess;
pub mod prompts;
pub mod sandbox;
pub mod selector;

#[cfg(test)]
mod testing;

pub use conversation::{Conversation, DialogTurn, Participant, ParticipantType};
pub use error::{Error, Result};
pub use generator::{CharacterGenerator, CharacterOutcome};
pub use postprocess::{NameHistory, extract_character_name, extract_utterance};
pub use sandbox::{CharacterSandbox, SandboxConfig};
pub use selector::select_next_speaker;
