//! LLM Client — the single point of entry for all Ollama calls in Meetyo.
//!
//! ARCHITECTURAL RULE: No other module may call the inference server directly.
//! All completions MUST go through this module.
//!
//! One attempt per request, bounded by the client timeout. Callers decide how
//! to degrade on failure (see `chat::service`).
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::chat::prompts::AssembledPrompt;
use crate::config::OllamaConfig;

const GENERATE_PATH: &str = "/api/generate";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_ctx: u32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    /// Missing `response` is treated as an empty completion.
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub eval_count: Option<u32>,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// The single completion client used by the chat service.
/// Wraps Ollama's `/api/generate` with fixed sampling options.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    num_ctx: u32,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            num_ctx: config.num_ctx,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one non-streamed completion request and returns the raw `response` text.
    pub async fn generate(&self, prompt: AssembledPrompt) -> Result<String, LlmError> {
        let prompt = prompt.into_inner();
        let request_body = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                num_ctx: self.num_ctx,
            },
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, GENERATE_PATH))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Ollama reports failures as {"error": "..."}
            let message = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)?;

        debug!(
            "Ollama call succeeded: model={}, prompt_tokens={:?}, output_tokens={:?}",
            self.model, parsed.prompt_eval_count, parsed.eval_count
        );

        Ok(parsed.response)
    }
}
