//! Wire types for the chat inference endpoint

use serde::{Deserialize, Serialize};

/// A single message in the chat history sent upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Name of the message sender
    pub sender: String,
    /// Message content
    pub message: String,
}

impl ChatMessage {
    pub fn new(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            message: message.into(),
        }
    }
}

/// Request payload for the chat endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Deprecated upstream, but the field must be present and empty
    pub memory: String,
    /// Scene-setting prompt
    pub prompt: String,
    /// The character the model speaks as
    pub bot_name: String,
    /// The character the model is talking to
    pub user_name: String,
    /// Previous messages, oldest first
    pub chat_history: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Build a request; `memory` is always sent empty.
    pub fn new(
        prompt: impl Into<String>,
        bot_name: impl Into<String>,
        user_name: impl Into<String>,
        chat_history: Vec<ChatMessage>,
    ) -> Self {
        Self {
            memory: String::new(),
            prompt: prompt.into(),
            bot_name: bot_name.into(),
            user_name: user_name.into(),
            chat_history,
        }
    }
}

/// Success body returned by the chat endpoint.
///
/// The endpoint returns more fields than this; only `model_output` is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub model_output: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_empty_memory() {
        let request = ChatRequest::new(
            "A tavern scene.",
            "Brian",
            "Jason",
            vec![ChatMessage::new("Jason", "Hi")],
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "memory": "",
                "prompt": "A tavern scene.",
                "bot_name": "Brian",
                "user_name": "Jason",
                "chat_history": [{"sender": "Jason", "message": "Hi"}]
            })
        );
    }

    #[test]
    fn test_response_ignores_extra_fields() {
        let body = r#"{"model_output": "  Hello there. ", "model_name": "guanaco"}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.model_output, "  Hello there. ");
    }
}
