//! Idea generation through the Gemini `generateContent` endpoint

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{MemoryError, Result};

/// Anything that can turn a prompt into free-text suggestions
pub trait SuggestionSource {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Prompt asking for a few small, printable memorial objects
pub fn build_prompt(relationship: &str, memory: &str) -> String {
    format!(
        "
You are a helpful assistant that creates personalized small 3D-printable memorial object suggestions.

Relationship: {relationship}
Memory: {memory}

Suggest 2 or 3 emotionally meaningful physical object ideas that are symbolic and small enough to be 3D printed (like keychains, mini charms, tokens). Keep them simple and gentle.
        "
    )
}

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.api_key.clone().ok_or(MemoryError::MissingApiKey)?;
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            settings.api_base.trim_end_matches('/'),
            settings.model
        );
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

impl SuggestionSource for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String> {
        let payload = build_request_body(prompt);

        info!("Requesting suggestions from {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, body));
        }

        let value: Value = response.json()?;
        let text = extract_reply_text(&value).ok_or(MemoryError::EmptyReply)?;
        debug!("Suggestion text: {}", text);
        Ok(text)
    }
}

/// Single-turn `generateContent` payload
pub fn build_request_body(prompt: &str) -> Value {
    serde_json::json!({
        "contents": [
            {"role": "user", "parts": [{"text": prompt}]}
        ]
    })
}

fn status_error(status: StatusCode, body: String) -> MemoryError {
    warn!("Suggestion request returned {}", status);
    MemoryError::ApiStatus {
        status: status.as_u16(),
        body: body.trim().to_string(),
    }
}

/// Join the text parts of the first candidate, trimmed
pub fn extract_reply_text(value: &Value) -> Option<String> {
    let parts = value
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
