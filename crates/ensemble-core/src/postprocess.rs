//! Cleanup of raw model output into a character name or an utterance

use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use regex::Regex;

use crate::prompts::AUTHOR_NAME;

/// Marker models emit when they start writing the other side's turn
const USER_MARKER: &str = "USER";

/// A name ends at the first period, asterisk, tag, space, or echoed author name.
static NAME_DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"[.*< ]|{}", regex::escape(AUTHOR_NAME));
    Regex::new(&pattern).unwrap()
});

/// Extract a character name from raw output: everything before the first delimiter.
pub fn extract_character_name(raw: &str) -> String {
    NAME_DELIMITER.split(raw).next().unwrap_or("").to_string()
}

/// Cut raw output at the first `USER` marker or `:`, whichever comes first.
pub fn extract_utterance(raw: &str) -> String {
    let cut = [raw.find(USER_MARKER), raw.find(':')]
        .into_iter()
        .flatten()
        .min();

    match cut {
        Some(index) => raw[..index].to_string(),
        None => raw.to_string(),
    }
}

/// Names generated so far in one generation batch.
///
/// Cloning shares the same buffer, so every task in a batch sees the others' names.
#[derive(Debug, Clone, Default)]
pub struct NameHistory {
    names: Arc<Mutex<Vec<String>>>,
}

impl NameHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` unless the batch already holds it. Returns whether it was recorded.
    ///
    /// The check and the insert happen under one lock, so two tasks can never
    /// both claim the same name.
    pub fn try_record(&self, name: &str) -> bool {
        let mut names = self.names.lock();
        if names.iter().any(|taken| taken == name) {
            return false;
        }
        names.push(name.to_string());
        true
    }

    /// Most recently recorded name
    pub fn last(&self) -> Option<String> {
        self.names.lock().last().cloned()
    }
}
