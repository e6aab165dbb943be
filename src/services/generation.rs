use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::core::config::Settings;

/// Failure classes for the external generation call. The engine never
/// retries; each class carries a remediation hint the UI can surface to the
/// teacher next to the error itself.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("network error while reaching the generation service: {0}")]
    Network(String),
    #[error("the generation service rejected the API credential: {0}")]
    Credential(String),
    #[error("the generation service returned an unexpected response shape: {0}")]
    UnexpectedShape(String),
    #[error("quiz generation failed: {0}")]
    Unknown(String),
}

impl GenerationError {
    pub fn remediation_hint(&self) -> &'static str {
        match self {
            GenerationError::Network(_) => "Check the internet connection and try again.",
            GenerationError::Credential(_) => {
                "Check the configured Gemini API key in the application settings."
            }
            GenerationError::UnexpectedShape(_) => {
                "Try again; the model returned no usable text content."
            }
            GenerationError::Unknown(_) => {
                "Wait a moment and try again, or rephrase the request."
            }
        }
    }
}

/// The opaque generation collaborator: prompt in, raw text out. The parsing
/// pipeline only ever sees this trait, so tests substitute a canned
/// implementation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_output_tokens: u32,
    temperature: f64,
    top_k: u32,
    top_p: f64,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.ai().request_timeout_seconds);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.ai().gemini_api_key.clone(),
            base_url: settings.ai().gemini_base_url.trim_end_matches('/').to_string(),
            model: settings.ai().model.clone(),
            max_output_tokens: settings.ai().max_output_tokens,
            temperature: settings.ai().temperature,
            top_k: settings.ai().top_k,
            top_p: settings.ai().top_p,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let started_at = OffsetDateTime::now_utc();
        let timer = Instant::now();

        let payload = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": self.temperature,
                "topK": self.top_k,
                "topP": self.top_p,
                "maxOutputTokens": self.max_output_tokens,
            }
        });

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        tracing::info!(
            model = %self.model,
            started_at = %started_at.format(&Rfc3339).unwrap_or_default(),
            "Sending generation request"
        );

        let response =
            self.client.post(&url).json(&payload).send().await.map_err(classify_transport_error)?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(classify_http_failure(status, &body));
        }

        let text = extract_candidate_text(&body)?;

        tracing::info!(
            model = %self.model,
            duration_seconds = timer.elapsed().as_secs_f64(),
            response_chars = text.len(),
            "Generation completed"
        );

        Ok(text)
    }
}

fn classify_transport_error(err: reqwest::Error) -> GenerationError {
    if err.is_connect() || err.is_timeout() {
        GenerationError::Network(err.to_string())
    } else {
        GenerationError::Unknown(err.to_string())
    }
}

fn classify_http_failure(status: StatusCode, body: &Value) -> GenerationError {
    let detail = body
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("no error detail")
        .to_string();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Credential(detail),
        _ if detail.to_lowercase().contains("api key") => GenerationError::Credential(detail),
        _ => GenerationError::Unknown(format!("{status}: {detail}")),
    }
}

fn extract_candidate_text(body: &Value) -> Result<String, GenerationError> {
    body.get("candidates")
        .and_then(|candidates| candidates.get(0))
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|parts| parts.get(0))
        .and_then(|part| part.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            GenerationError::UnexpectedShape(
                "missing candidates[0].content.parts[0].text".to_string(),
            )
        })
}
