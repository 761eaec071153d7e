//! Conversation state: participants and the ordered log of dialog turns.
//!
//! The whole conversation travels with every request; nothing here is kept
//! between calls.

use std::collections::HashSet;

use ensemble_ai::ChatMessage;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Whether a participant is the human user or a generated character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParticipantType {
    Human,
    Ai,
}

/// An actor in the conversation. Identified by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "type")]
    pub kind: ParticipantType,
    pub name: String,
    pub backstory: String,
}

impl Participant {
    pub fn human(name: impl Into<String>, backstory: impl Into<String>) -> Self {
        Self {
            kind: ParticipantType::Human,
            name: name.into(),
            backstory: backstory.into(),
        }
    }

    pub fn ai(name: impl Into<String>, backstory: impl Into<String>) -> Self {
        Self {
            kind: ParticipantType::Ai,
            name: name.into(),
            backstory: backstory.into(),
        }
    }

    pub fn is_ai(&self) -> bool {
        self.kind == ParticipantType::Ai
    }
}

/// One attributed utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogTurn {
    /// Name of the speaking participant
    pub participant: String,
    pub content: String,
}

impl DialogTurn {
    pub fn new(participant: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            participant: participant.into(),
            content: content.into(),
        }
    }
}

/// Full conversation state: participants plus append-only dialog history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub dialog_turns: Vec<DialogTurn>,
}

impl Conversation {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self {
            participants,
            dialog_turns: Vec::new(),
        }
    }

    /// AI participants in declaration order
    pub fn ai_participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_ai())
    }

    pub fn find_participant(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.name == name)
    }

    pub fn last_turn(&self) -> Option<&DialogTurn> {
        self.dialog_turns.last()
    }

    /// Append a turn. Existing turns are never touched.
    pub fn push_turn(&mut self, turn: DialogTurn) {
        self.dialog_turns.push(turn);
    }

    /// Dialog turns in the wire shape expected by the inference endpoint
    pub fn chat_history(&self) -> Vec<ChatMessage> {
        self.dialog_turns
            .iter()
            .map(|turn| ChatMessage::new(&turn.participant, &turn.content))
            .collect()
    }

    /// Check that names are non-empty and unique, and that every turn
    /// references a known participant.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for participant in &self.participants {
            if participant.name.trim().is_empty() {
                return Err(Error::InvalidConversation(
                    "participant names must not be empty".into(),
                ));
            }
            if !names.insert(participant.name.as_str()) {
                return Err(Error::InvalidConversation(format!(
                    "duplicate participant name '{}'",
                    participant.name
                )));
            }
        }

        if let Some((index, turn)) = self
            .dialog_turns
            .iter()
            .enumerate()
            .find(|(_, turn)| self.find_participant(&turn.participant).is_none())
        {
            return Err(Error::InvalidConversation(format!(
                "dialog turn {} references unknown participant '{}'",
                index, turn.participant
            )));
        }

        Ok(())
    }
}
