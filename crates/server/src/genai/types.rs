//! Types for the chat completions API.

use serde::{Deserialize, Serialize};

/// A single prompt to complete.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instructions for the model.
    pub system_prompt: String,
    /// The question.
    pub user_prompt: String,
    /// Output bound.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// A message in a chat completion request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatMessage<'a> {
    /// "system" or "user".
    pub role: &'static str,
    pub content: &'a str,
}

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Response body from `POST /chat/completions`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResponseMessage {
    /// Some providers return `null` content for filtered output.
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, empty if there is none.
    pub fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default()
    }
}
