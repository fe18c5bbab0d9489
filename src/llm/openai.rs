use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::llm::prompts::{StandupRequest, SYSTEM_PROMPT};
use crate::llm::provider::LLMProvider;

const NAME: &str = "OpenAI";

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAIProvider {
    pub fn new(api_key: String, model: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn generate(&self, request: &StandupRequest<'_>) -> Result<String> {
        tracing::debug!("Sending ~{} tokens to OpenAI", request.estimate_tokens());

        let request_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.to_prompt(),
                },
            ],
            max_tokens: 1000,
            temperature: 0.7,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::LLMApi(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::LLMApi(format!(
                "OpenAI API error ({}): {}",
                status, body
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::LLMApi(format!("Failed to parse OpenAI response: {}", e)))?;

        response_text(result)
    }

    fn name(&self) -> &str {
        NAME
    }
}

fn response_text(result: ChatResponse) -> Result<String> {
    result
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| Error::EmptyResponse(NAME.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<String> {
        response_text(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_first_choice_is_used() {
        let json = r#"{"choices": [
            {"message": {"role": "assistant", "content": "Yesterday I fixed auth."}},
            {"message": {"role": "assistant", "content": "ignored"}}
        ]}"#;
        assert_eq!(parse(json).unwrap(), "Yesterday I fixed auth.");
    }

    #[test]
    fn test_missing_content_is_an_error() {
        for json in [
            r#"{"choices": []}"#,
            r#"{}"#,
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
            r#"{"choices": [{"message": {"role": "assistant", "content": "   "}}]}"#,
        ] {
            assert!(matches!(parse(json), Err(Error::EmptyResponse(_))), "{}", json);
        }
    }
}
