use std::future::Future;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::llm::prompts::{StandupRequest, SYSTEM_PROMPT};
use crate::llm::provider::LLMProvider;

const PRIMARY_MODEL: &str = "gemini-2.0-flash";
const FALLBACK_MODEL: &str = "gemini-1.5-flash";
const NAME: &str = "Google Gemini";

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    models: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key,
            models: vec![PRIMARY_MODEL.to_string(), FALLBACK_MODEL.to_string()],
        })
    }

    async fn generate_with_model(&self, model: &str, body: &GeminiRequest) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(body)
            .send()
            .await
            .map_err(|e| Error::LLMApi(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, model, &body));
        }

        let result: GeminiResponse = response
            .json()
            .await
            .map_err(|e| Error::LLMApi(format!("Failed to parse Gemini response: {}", e)))?;

        response_text(result)
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate(&self, request: &StandupRequest<'_>) -> Result<String> {
        tracing::debug!("Sending ~{} tokens to Gemini", request.estimate_tokens());

        let body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("{}\n\n{}", SYSTEM_PROMPT, request.to_prompt()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 1024,
                top_p: 0.95,
                top_k: 40,
            },
        };

        let body = &body;
        first_available(&self.models, move |model| async move {
            self.generate_with_model(&model, body).await
        })
        .await
    }

    fn name(&self) -> &str {
        NAME
    }
}

/// Tries each model in order. Only a missing model moves on to the next one.
async fn first_available<F, Fut>(models: &[String], mut call: F) -> Result<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let mut last_error = Error::LLMApi("No Gemini model configured".to_string());
    for model in models {
        match call(model.clone()).await {
            Ok(text) => return Ok(text),
            Err(e) => {
                let model_missing = matches!(e, Error::ModelUnavailable(_));
                tracing::warn!("Gemini model {} failed: {}", model, e);
                last_error = e;
                if !model_missing {
                    break;
                }
            }
        }
    }

    Err(last_error)
}

fn status_error(status: StatusCode, model: &str, body: &str) -> Error {
    if status == StatusCode::NOT_FOUND {
        return Error::ModelUnavailable(model.to_string());
    }
    Error::LLMApi(format!("Gemini API error ({}): {}", status, body))
}

fn response_text(result: GeminiResponse) -> Result<String> {
    result
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| Error::EmptyResponse(NAME.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn default_models() -> Vec<String> {
        vec![PRIMARY_MODEL.to_string(), FALLBACK_MODEL.to_string()]
    }

    async fn run_models(outcomes: Vec<(&str, Result<String>)>) -> (Result<String>, Vec<String>) {
        let calls = RefCell::new(Vec::new());
        let outcomes = RefCell::new(outcomes.into_iter());

        let result = first_available(&default_models(), |model| {
            calls.borrow_mut().push(model.clone());
            let (expected, outcome) = outcomes.borrow_mut().next().unwrap();
            assert_eq!(model, expected);
            async move { outcome }
        })
        .await;

        (result, calls.into_inner())
    }

    #[tokio::test]
    async fn test_missing_primary_model_retries_secondary() {
        let (result, calls) = run_models(vec![
            (PRIMARY_MODEL, Err(status_error(StatusCode::NOT_FOUND, PRIMARY_MODEL, ""))),
            (FALLBACK_MODEL, Ok("Yesterday I fixed auth.".to_string())),
        ])
        .await;

        assert_eq!(result.unwrap(), "Yesterday I fixed auth.");
        assert_eq!(calls, default_models());
    }

    #[tokio::test]
    async fn test_other_errors_do_not_retry() {
        let (result, calls) = run_models(vec![(
            PRIMARY_MODEL,
            Err(status_error(StatusCode::TOO_MANY_REQUESTS, PRIMARY_MODEL, "quota")),
        )])
        .await;

        assert!(matches!(result, Err(Error::LLMApi(msg)) if msg.contains("quota")));
        assert_eq!(calls, vec![PRIMARY_MODEL.to_string()]);
    }

    #[tokio::test]
    async fn test_both_models_missing_is_an_error() {
        let (result, calls) = run_models(vec![
            (PRIMARY_MODEL, Err(Error::ModelUnavailable(PRIMARY_MODEL.to_string()))),
            (FALLBACK_MODEL, Err(Error::ModelUnavailable(FALLBACK_MODEL.to_string()))),
        ])
        .await;

        assert!(matches!(result, Err(Error::ModelUnavailable(m)) if m == FALLBACK_MODEL));
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn test_response_text() {
        let json = r#"{"candidates": [{"content": {"parts": [{"text": "Yesterday I fixed auth."}]}}]}"#;
        let result: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response_text(result).unwrap(), "Yesterday I fixed auth.");
    }

    #[test]
    fn test_missing_text_is_an_error() {
        for json in [
            r#"{}"#,
            r#"{"candidates": []}"#,
            r#"{"candidates": [{"content": null, "finishReason": "SAFETY"}]}"#,
            r#"{"candidates": [{"content": {"parts": []}}]}"#,
            r#"{"candidates": [{"content": {"parts": [{"inlineData": {}}]}}]}"#,
        ] {
            let result: GeminiResponse = serde_json::from_str(json).unwrap();
            assert!(matches!(response_text(result), Err(Error::EmptyResponse(_))), "{}", json);
        }
    }
}
