use async_trait::async_trait;

use crate::error::Result;
use crate::llm::prompts::StandupRequest;
use crate::llm::provider::LLMProvider;
use crate::standup::renderer;

/// Renders the standup from a template instead of calling a remote model.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProvider;

impl LocalProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LLMProvider for LocalProvider {
    async fn generate(&self, request: &StandupRequest<'_>) -> Result<String> {
        tracing::info!("Generating a basic standup summary locally (no AI API used)...");
        Ok(renderer::render(request.commits))
    }

    fn name(&self) -> &str {
        "Local template"
    }
}
