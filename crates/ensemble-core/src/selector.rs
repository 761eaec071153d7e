//! Next-speaker selection.
//!
//! A liveness heuristic over the dialog history. In priority order:
//!
//! 1. No turns yet: any AI participant.
//! 2. An AI participant named in the last turn (other than its speaker).
//! 3. An AI participant that has neither spoken nor been named in the last
//!    [`RECENT_WINDOW`] turns.
//! 4. Any AI participant other than the last speaker, or the sole AI
//!    participant when there is only one.
//!
//! Every tie is broken uniformly at random with the caller's RNG.

use std::collections::HashSet;

use rand::{Rng, seq::SliceRandom};

use crate::{
    conversation::{Conversation, Participant},
    error::{Error, Result},
};

/// Number of trailing turns that count as "recent activity"
pub const RECENT_WINDOW: usize = 5;

/// Choose who speaks next.
pub fn select_next_speaker<'a, R: Rng + ?Sized>(
    conversation: &'a Conversation,
    rng: &mut R,
) -> Result<&'a Participant> {
    let characters: Vec<&Participant> = conversation.ai_participants().collect();
    if characters.is_empty() {
        return Err(Error::NoEligibleSpeaker);
    }

    let Some(last_turn) = conversation.last_turn() else {
        return pick(&characters, rng).ok_or(Error::NoEligibleSpeaker);
    };
    let last_speaker = last_turn.participant.as_str();

    let addressed: Vec<&Participant> = characters
        .iter()
        .copied()
        .filter(|p| p.name != last_speaker && mentions(&last_turn.content, &p.name))
        .collect();
    if let Some(speaker) = pick(&addressed, rng) {
        return Ok(speaker);
    }

    let turns = &conversation.dialog_turns;
    let recent = &turns[turns.len().saturating_sub(RECENT_WINDOW)..];
    let mut active: HashSet<&str> = HashSet::new();
    for turn in recent {
        active.insert(turn.participant.as_str());
        for character in &characters {
            if mentions(&turn.content, &character.name) {
                active.insert(character.name.as_str());
            }
        }
    }

    let quiet: Vec<&Participant> = characters
        .iter()
        .copied()
        .filter(|p| !active.contains(p.name.as_str()))
        .collect();
    if let Some(speaker) = pick(&quiet, rng) {
        return Ok(speaker);
    }

    let others: Vec<&Participant> = characters
        .iter()
        .copied()
        .filter(|p| p.name != last_speaker)
        .collect();
    Ok(pick(&others, rng).unwrap_or(characters[0]))
}

/// Plain substring containment: "Kael" also matches "Kaelthas".
fn mentions(content: &str, name: &str) -> bool {
    !name.is_empty() && content.contains(name)
}

fn pick<'a, R: Rng + ?Sized>(
    candidates: &[&'a Participant],
    rng: &mut R,
) -> Option<&'a Participant> {
    candidates.choose(rng).copied()
}
