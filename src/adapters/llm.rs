//! OpenAI-compatible chat completion client for insight generation.
//!
//! Sends a single prompt and returns the model's text content. Responses are
//! requested as JSON objects but models still wrap output in markdown fences
//! sometimes, so the raw text is returned and callers strip fences before
//! parsing.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

const DEFAULT_TEMPERATURE: f32 = 0.4;

#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
}

impl LlmClient {
    pub fn new(
        http: reqwest::Client,
        api_base: String,
        api_key: Option<String>,
        model: String,
    ) -> Self {
        Self {
            http,
            api_base,
            api_key,
            model,
        }
    }

    /// Whether a key is configured. Callers skip the upstream call entirely
    /// and go straight to their fallback when this is false.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one completion request and returns the raw text content.
    ///
    /// # Errors
    /// Returns `Error::Config` when no API key is set and `Error::Http` or
    /// `Error::Validation` when the upstream fails or answers with an
    /// unusable body. Callers are expected to catch these and fall back.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let key = self.api_key.as_deref().ok_or_else(|| Error::Config {
            message: "LLM API key not configured".to_string(),
        })?;

        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            temperature: DEFAULT_TEMPERATURE,
            response_format: ResponseFormat {
                r#type: "json_object".to_string(),
            },
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
        };

        let response: ChatCompletionResponse = self
            .http
            .post(&url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::validation("LLM response contained no choices"))
    }
}

/// Strips a surrounding markdown code fence, with or without a language tag.
pub fn strip_json_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    temperature: f32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: String,
}
