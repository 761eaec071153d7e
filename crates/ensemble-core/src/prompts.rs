//! Prompt text and scripted seed dialogues

use ensemble_ai::ChatMessage;

use crate::conversation::Participant;

/// The author in the character-generation script. Models sometimes echo this
/// name straight after their answer.
pub const AUTHOR_NAME: &str = "Jason";

/// The co-writer the model plays during character generation
pub const COWRITER_NAME: &str = "Brian";

/// Seed name used before any name has been generated in a batch
pub const FALLBACK_SEED_NAME: &str = "Seraphina Vale";

pub const HUMAN_NAME: &str = "Stranger";
pub const HUMAN_BACKSTORY: &str = "A curious human exploring in a fantasy realm.";
pub const FALLBACK_BACKSTORY: &str = "A mysterious character from a fantasy world.";

/// Scene prompt for character generation
pub const WRITERS_BLOCK_PROMPT: &str = "An engaging texting conversation between Jason and Brian, an author and his cowriter. Jason is working on a new fantasy novel, and he comes to Brian when he has writer's block.";

const SEED_BACKSTORY: &str = "Seraphina is a half-angel, half-human warrior born in the celestial realm of Valoria. She was exiled from Valoria at a young age due to her rebellious nature and powerful magic which threatened the angelic rulers there.";

/// Scripted history asking for a new name.
///
/// The co-writer's scripted answer is the last name generated in this batch,
/// which nudges the model away from repeating it.
pub fn name_generation_history(last_name: Option<&str>) -> Vec<ChatMessage> {
    let seed = last_name.unwrap_or(FALLBACK_SEED_NAME);
    vec![
        ChatMessage::new(
            AUTHOR_NAME,
            "Hey Brian, I need your help coming up with some characters for my new novel. Can you make up new character's name? Just the name, please.",
        ),
        ChatMessage::new(COWRITER_NAME, format!("{}.", seed)),
        ChatMessage::new(
            AUTHOR_NAME,
            "Perfect! One more... just the first name and last name, please.",
        ),
    ]
}

/// Scripted history asking for the backstory of `name`
pub fn backstory_generation_history(name: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::new(
            AUTHOR_NAME,
            format!(
                "Hey Brian, I need your help coming up with a backstory for a new character in my fantasy novel. Name: {}. Make up this character's backstory, and key attributes!",
                FALLBACK_SEED_NAME
            ),
        ),
        ChatMessage::new(COWRITER_NAME, SEED_BACKSTORY),
        ChatMessage::new(
            AUTHOR_NAME,
            format!("Amazing!, Ok, now one more. Name: {}.", name),
        ),
    ]
}

/// Scene-setting prompt for continuing a conversation among `characters`.
///
/// A lone character gets a one-on-one framing with the user.
pub fn scene_prompt(characters: &[&Participant]) -> String {
    match characters {
        [] => "An engaging dialogue amongst fantasy characters in a novel.".to_string(),
        [only] => format!(
            "An engaging conversation between {name} and a user. {name} is a character who is mystical in a fantasy novel. {name}'s backstory: {backstory}",
            name = only.name,
            backstory = only.backstory
        ),
        _ => {
            let names: Vec<&str> = characters.iter().map(|p| p.name.as_str()).collect();
            let mut prompt = format!(
                "An engaging dialogue amongst fantasy characters in a novel. The characters are: {}. ",
                join_names(&names)
            );
            for character in characters {
                prompt.push_str(&format!(
                    "\n{}'s backstory: {}",
                    character.name, character.backstory
                ));
            }
            prompt
        }
    }
}

/// Greeting used when a conversation has no turns yet
pub fn greeting(name: &str) -> String {
    format!("Hello. I am {}.", name)
}

fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [one] => one.to_string(),
        [first, second] => format!("{} and {}", first, second),
        [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
    }
}
