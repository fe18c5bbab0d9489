use async_trait::async_trait;
use crate::error::Result;
use crate::llm::prompts::StandupRequest;

/// A text-generation backend. Any `Err` means "no text"; callers fall back to
/// the local renderer.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn generate(&self, request: &StandupRequest<'_>) -> Result<String>;
    fn name(&self) -> &str;
}
