mod claude_api;
mod openai;

pub use claude_api::ClaudeApiProvider;
pub use openai::OpenAiProvider;

use crate::Result;

/// Trait for language-model completion providers
#[async_trait::async_trait]
pub trait AiProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Send a single user prompt and return the model's text reply
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}
