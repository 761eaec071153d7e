//! Concurrent, staggered character generation.
//!
//! Each character costs two inference calls (name, then backstory). All
//! characters are generated concurrently on the calling task, with task `i`
//! delayed by `stagger * i` so requests reach the endpoint spread out instead
//! of all at once. A character whose calls fail is replaced by a placeholder,
//! so a batch always yields exactly `count` participants.
//!
//! Tasks share one [`NameHistory`]: each name request is seeded with the most
//! recent name so far. The stagger makes it likely, but not certain, that task
//! `i` has recorded its name before task `i + 1` asks for one.

use std::{sync::Arc, time::Duration};

use ensemble_ai::{ChatRequest, InferenceClient};
use futures::future::join_all;

use crate::{
    conversation::Participant,
    error::{Error, Result},
    postprocess::{NameHistory, extract_character_name},
    prompts::{
        AUTHOR_NAME, COWRITER_NAME, FALLBACK_BACKSTORY, HUMAN_NAME, WRITERS_BLOCK_PROMPT,
        backstory_generation_history, name_generation_history,
    },
};

/// Result of generating one character
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharacterOutcome {
    /// Name and backstory came from the model
    Generated(Participant),
    /// Generation failed; a placeholder stands in
    Fallback {
        participant: Participant,
        reason: String,
    },
}

impl CharacterOutcome {
    pub fn participant(&self) -> &Participant {
        match self {
            CharacterOutcome::Generated(participant) => participant,
            CharacterOutcome::Fallback { participant, .. } => participant,
        }
    }

    pub fn into_participant(self) -> Participant {
        match self {
            CharacterOutcome::Generated(participant) => participant,
            CharacterOutcome::Fallback { participant, .. } => participant,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, CharacterOutcome::Fallback { .. })
    }
}

const FALLBACK_NAME_PREFIX: &str = "Character";

/// Placeholder for the character at `index` (0-based)
pub fn fallback_participant(index: usize) -> Participant {
    Participant::ai(
        format!("{}{}", FALLBACK_NAME_PREFIX, index + 1),
        FALLBACK_BACKSTORY,
    )
}

/// Names a generated character may not take: the human's and any placeholder's.
fn is_reserved_name(name: &str) -> bool {
    if name == HUMAN_NAME {
        return true;
    }
    match name.strip_prefix(FALLBACK_NAME_PREFIX) {
        Some(suffix) => !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Generates batches of AI characters
pub struct CharacterGenerator {
    client: Arc<dyn InferenceClient>,
}

impl CharacterGenerator {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }

    /// Generate `count` characters, returned in index order.
    pub async fn generate(&self, count: usize, stagger: Duration) -> Vec<CharacterOutcome> {
        let history = NameHistory::new();

        let tasks = (0..count).map(|index| {
            let history = history.clone();
            async move { self.generate_one(index, stagger, &history).await }
        });

        // join_all yields results in launch order regardless of completion order
        join_all(tasks).await
    }

    async fn generate_one(
        &self,
        index: usize,
        stagger: Duration,
        history: &NameHistory,
    ) -> CharacterOutcome {
        tokio::time::sleep(stagger.saturating_mul(index as u32)).await;

        match self.try_generate(stagger, history).await {
            Ok(participant) => CharacterOutcome::Generated(participant),
            Err(e) => {
                tracing::warn!("Error generating character {}: {}", index + 1, e);
                CharacterOutcome::Fallback {
                    participant: fallback_participant(index),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn try_generate(&self, stagger: Duration, history: &NameHistory) -> Result<Participant> {
        let name_request = ChatRequest::new(
            WRITERS_BLOCK_PROMPT,
            COWRITER_NAME,
            AUTHOR_NAME,
            name_generation_history(history.last().as_deref()),
        );
        let raw_name = self.client.invoke(&name_request).await?;
        let name = extract_character_name(&raw_name);
        if name.is_empty() {
            return Err(Error::EmptyGeneration("name"));
        }
        if is_reserved_name(&name) || !history.try_record(&name) {
            return Err(Error::DuplicateName(name));
        }
        tracing::info!("Generated character name: {}", name);

        tokio::time::sleep(stagger.saturating_mul(2)).await;

        let backstory_request = ChatRequest::new(
            WRITERS_BLOCK_PROMPT,
            COWRITER_NAME,
            AUTHOR_NAME,
            backstory_generation_history(&name),
        );
        let backstory = self.client.invoke(&backstory_request).await?;
        let backstory = backstory.trim();
        if backstory.is_empty() {
            return Err(Error::EmptyGeneration("backstory"));
        }
        tracing::info!("Generated backstory for {}: {}", name, backstory);

        Ok(Participant::ai(name, backstory))
    }
}
