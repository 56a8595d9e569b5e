//! Text-generation capability.
//!
//! The server only needs one thing from a language model: turn a system and
//! user prompt into text. [`Generator`] is that seam; [`GenAiClient`] talks to
//! an OpenAI-compatible chat completions API (`OpenRouter` by default).

mod client;
mod error;
mod types;

use async_trait::async_trait;

pub use client::GenAiClient;
pub use error::GenerationError;
pub use types::CompletionRequest;

/// Something that can complete a prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Return the model's text for `request`.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError>;
}
