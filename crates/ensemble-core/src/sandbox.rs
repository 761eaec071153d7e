//! Entry points: cast initialization and single-turn conversation continuation

use std::{sync::Arc, time::Duration};

use ensemble_ai::{ChatRequest, InferenceClient};
use parking_lot::Mutex;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    conversation::{Conversation, DialogTurn, Participant},
    error::{Error, Result},
    generator::{CharacterGenerator, CharacterOutcome},
    postprocess::extract_utterance,
    prompts::{HUMAN_BACKSTORY, HUMAN_NAME, greeting, scene_prompt},
    selector::select_next_speaker,
};

/// Sandbox configuration
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Delay between the starts of consecutive character-generation tasks
    pub stagger: Duration,
    /// Upper bound on `count` for a single initialization
    pub max_characters: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            stagger: Duration::from_secs(1),
            max_characters: 10,
        }
    }
}

/// Orchestrates character creation and turn-taking for stateless requests.
pub struct CharacterSandbox {
    client: Arc<dyn InferenceClient>,
    generator: CharacterGenerator,
    config: SandboxConfig,
    rng: Mutex<StdRng>,
}

impl CharacterSandbox {
    pub fn new(client: Arc<dyn InferenceClient>, config: SandboxConfig) -> Self {
        Self {
            generator: CharacterGenerator::new(client.clone()),
            client,
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Replace the random source used for speaker selection
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Build a cast: an optional human followed by `count` AI characters.
    ///
    /// Individual generation failures never fail the call; they come back as
    /// placeholder characters.
    pub async fn initialize_characters(
        &self,
        count: usize,
        user_engagement_enabled: bool,
    ) -> Result<Vec<Participant>> {
        if count > self.config.max_characters {
            return Err(Error::InvalidRequest(format!(
                "count must be at most {}, got {}",
                self.config.max_characters, count
            )));
        }

        tracing::info!(
            "Initializing {} characters with userEngagement={}",
            count,
            user_engagement_enabled
        );

        let mut participants = Vec::with_capacity(count + 1);
        if user_engagement_enabled {
            participants.push(Participant::human(HUMAN_NAME, HUMAN_BACKSTORY));
        }

        let outcomes = self.generator.generate(count, self.config.stagger).await;
        let fallbacks = outcomes.iter().filter(|o| o.is_fallback()).count();
        if fallbacks > 0 {
            tracing::warn!(
                "{} of {} characters fell back to placeholders",
                fallbacks,
                count
            );
        }
        participants.extend(outcomes.into_iter().map(CharacterOutcome::into_participant));

        Ok(participants)
    }

    /// Append exactly one turn to `conversation` and return it.
    ///
    /// An empty conversation gets a greeting from the chosen speaker without
    /// calling the model.
    pub async fn continue_conversation(
        &self,
        mut conversation: Conversation,
    ) -> Result<Conversation> {
        tracing::info!(
            "Continuing conversation with {} participants and {} turns",
            conversation.participants.len(),
            conversation.dialog_turns.len()
        );
        conversation.validate()?;

        let next_speaker = {
            let mut rng = self.rng.lock();
            select_next_speaker(&conversation, &mut *rng)?.clone()
        };
        tracing::debug!("Next speaker: {}", next_speaker.name);

        let chat_history = conversation.chat_history();

        let Some(last_turn) = conversation.last_turn() else {
            let content = greeting(&next_speaker.name);
            conversation.push_turn(DialogTurn::new(next_speaker.name, content));
            return Ok(conversation);
        };
        let last_speaker = last_turn.participant.clone();

        let characters: Vec<&Participant> = conversation.ai_participants().collect();
        let request = ChatRequest::new(
            scene_prompt(&characters),
            &next_speaker.name,
            last_speaker,
            chat_history,
        );

        let raw = self.client.invoke(&request).await?;
        let content = extract_utterance(&raw);
        if content.trim().is_empty() {
            tracing::warn!(
                "Model reply for {} was empty after cleanup: {:?}",
                next_speaker.name,
                raw
            );
        }

        conversation.push_turn(DialogTurn::new(next_speaker.name, content));
        Ok(conversation)
    }
}
