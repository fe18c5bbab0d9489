use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::llm::prompts::{StandupRequest, SYSTEM_PROMPT};
use crate::llm::provider::LLMProvider;

const NAME: &str = "Anthropic Claude";

pub struct ClaudeProvider {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ClaudeMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    error: Option<ClaudeError>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ClaudeError {
    message: String,
}

impl ClaudeProvider {
    pub fn new(api_key: String, model: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| "claude-3-sonnet-20240229".to_string()),
        })
    }
}

#[async_trait]
impl LLMProvider for ClaudeProvider {
    async fn generate(&self, request: &StandupRequest<'_>) -> Result<String> {
        let prompt = request.to_prompt();
        tracing::debug!("Sending ~{} tokens to Claude", request.estimate_tokens());

        let request_body = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 1000,
            temperature: 0.7,
            system: Some(SYSTEM_PROMPT.to_string()),
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::LLMApi(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::LLMApi(format!(
                "Claude API error ({}): {}",
                status, body
            )));
        }

        let result: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| Error::LLMApi(format!("Failed to parse Claude response: {}", e)))?;

        response_text(result)
    }

    fn name(&self) -> &str {
        NAME
    }
}

/// Joins the text blocks of a reply. A reply without any text is an error.
fn response_text(result: ClaudeResponse) -> Result<String> {
    if let Some(error) = result.error {
        return Err(Error::LLMApi(error.message));
    }

    let text = result
        .content
        .into_iter()
        .filter(|c| c.content_type == "text")
        .filter_map(|c| c.text)
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(Error::EmptyResponse(NAME.to_string()));
    }

    Ok(text)
}
