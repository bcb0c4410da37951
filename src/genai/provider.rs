//! Text-completion provider collaborators.
//!
//! The pipeline only needs `complete(prompt) -> text`; everything else
//! (prompt construction, response interpretation) lives in the adapter, so
//! providers stay swappable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors from a completion provider call.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("rate limited by provider")]
    RateLimited,
    #[error("provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("provider returned an empty completion")]
    EmptyCompletion,
}

/// An external text-completion service.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short provider name for logs and health output.
    fn name(&self) -> &str;

    /// Complete a prompt into free-form text.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Cheap reachability probe, used for warm-up and health checks only.
    async fn probe(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Tuning knobs for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiOptions {
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GeminiOptions {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    options: GeminiOptions,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GeminiClient {
    pub fn new(api_key: String, options: GeminiOptions) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("codecritic/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            api_key,
            options,
        }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.options.endpoint.trim_end_matches('/'),
            self.options.model,
            self.api_key
        )
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.options.temperature,
                top_p: self.options.top_p,
                top_k: self.options.top_k,
                max_output_tokens: self.options.max_output_tokens,
            },
        };

        let response = self
            .http
            .post(self.generate_url())
            .json(&body)
            .timeout(self.options.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Network(e)
                }
            })?;

        match response.status().as_u16() {
            200 => {
                let parsed: GenerateContentResponse = response.json().await?;
                let text: String = parsed
                    .candidates
                    .into_iter()
                    .filter_map(|c| c.content)
                    .flat_map(|c| c.parts)
                    .map(|p| p.text)
                    .collect();

                if text.trim().is_empty() {
                    return Err(ProviderError::EmptyCompletion);
                }
                debug!(chars = text.len(), "completion received");
                Ok(text)
            }
            429 => Err(ProviderError::RateLimited),
            status => {
                let message: String =
                    response.text().await.unwrap_or_default().chars().take(200).collect();
                Err(ProviderError::Status { status, message })
            }
        }
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        let url = format!(
            "{}/v1beta/models?key={}",
            self.options.endpoint.trim_end_matches('/'),
            self.api_key
        );

        let response = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Network(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ProviderError::Status {
                status: status.as_u16(),
                message: "model listing failed".to_string(),
            })
        }
    }
}
