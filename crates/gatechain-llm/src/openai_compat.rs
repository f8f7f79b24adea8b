//! OpenAI-compatible provider implementation.
//!
//! [`OpenAiCompatProvider`] talks to any endpoint that accepts the OpenAI
//! chat completion format: OpenAI itself, Groq, DeepSeek, Mistral, Together,
//! OpenRouter, Gemini's compat endpoint, and local servers.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::LlmProviderConfig;
use crate::error::{ProviderError, Result};
use crate::provider::Provider;
use crate::types::{ChatRequest, ChatResponse};

/// A provider that uses the OpenAI-compatible chat completion API.
///
/// The API key is captured at construction and never re-read.
pub struct OpenAiCompatProvider {
    config: LlmProviderConfig,
    http: reqwest::Client,
    api_key: String,
}

impl OpenAiCompatProvider {
    /// Create a provider with an explicit API key.
    ///
    /// # Errors
    ///
    /// [`ProviderError::NotConfigured`] when the timeout is zero or the HTTP
    /// client cannot be built.
    pub fn with_api_key(config: LlmProviderConfig, api_key: String) -> Result<Self> {
        let http = build_client(&config)?;
        Ok(Self {
            config,
            http,
            api_key,
        })
    }

    /// Create a provider, reading the API key from the environment now.
    ///
    /// # Errors
    ///
    /// [`ProviderError::NotConfigured`] when the variable is unset or empty,
    /// or when [`with_api_key`](Self::with_api_key) fails.
    pub fn from_env(config: LlmProviderConfig) -> Result<Self> {
        let api_key = read_api_key(&config.api_key_env)?;
        Self::with_api_key(config, api_key)
    }

    fn completions_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    async fn error_from_response(
        &self,
        response: reqwest::Response,
        model: &str,
    ) -> ProviderError {
        let status = response.status();

        if status.as_u16() == 429 {
            let header_ms = parse_retry_after_header(&response);
            let body = response.text().await.unwrap_or_default();

            // Billing and quota failures come back as 429 too, but waiting
            // will not fix them.
            if is_quota_exhausted(&body) {
                warn!(provider = %self.config.name, "quota exhausted (not retryable)");
                let msg = extract_error_message(&body)
                    .unwrap_or_else(|| "credits exhausted or spending limit reached".into());
                return ProviderError::RequestFailed(msg);
            }

            let retry_after_ms = header_ms
                .or_else(|| parse_retry_after_ms(&body))
                .unwrap_or(1000);
            warn!(
                provider = %self.config.name,
                retry_after_ms,
                "rate limited"
            );
            return ProviderError::RateLimited { retry_after_ms };
        }

        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => ProviderError::AuthFailed(body),
            404 => ProviderError::ModelNotFound(format!("model '{model}': {body}")),
            _ => ProviderError::RequestFailed(format!("HTTP {status}: {body}")),
        }
    }
}

fn build_client(config: &LlmProviderConfig) -> Result<reqwest::Client> {
    let timeout = config.timeout();
    if timeout.is_zero() {
        return Err(ProviderError::NotConfigured(format!(
            "timeout_secs for {} must be greater than zero",
            config.name
        )));
    }
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| {
            ProviderError::NotConfigured(format!(
                "failed to build HTTP client for {}: {e}",
                config.name
            ))
        })
}

fn read_api_key(env_var: &str) -> Result<String> {
    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ProviderError::NotConfigured(format!("set {env_var} env var"))),
    }
}

fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Http(err)
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.completions_url();

        debug!(
            provider = %self.config.name,
            model = %request.model,
            messages = request.messages.len(),
            structured = request.response_format.is_some(),
            "sending chat completion request"
        );

        let mut req = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        for (k, v) in &self.config.headers {
            req = req.header(k.as_str(), v.as_str());
        }

        let response = req.json(request).send().await.map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response, &request.model).await);
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::InvalidResponse(format!("failed to parse response: {e}"))
            }
        })?;

        debug!(
            provider = %self.config.name,
            model = %chat_response.model,
            choices = chat_response.choices.len(),
            "chat completion response received"
        );

        Ok(chat_response)
    }
}

/// A 429 body that names billing or quota is permanent, not a rate limit.
fn is_quota_exhausted(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("exhausted")
        || lower.contains("spending limit")
        || lower.contains("credits")
        || lower.contains("billing")
        || lower.contains("quota exceeded")
        || lower.contains("insufficient_quota")
}

/// Pull `error.message` (OpenAI) or a bare `error` string (xAI) out of a body.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error").and_then(|v| {
        v.get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .or_else(|| v.as_str().map(String::from))
    })
}

/// Numeric `Retry-After` (seconds) in milliseconds. HTTP-date values are ignored.
fn parse_retry_after_header(response: &reqwest::Response) -> Option<u64> {
    let header_val = response
        .headers()
        .get("retry-after")
        .or_else(|| response.headers().get("x-ratelimit-reset-after"))
        .and_then(|v| v.to_str().ok())?;

    header_val
        .parse::<f64>()
        .ok()
        .map(|secs| (secs * 1000.0).max(0.0) as u64)
}

fn parse_retry_after_ms(body: &str) -> Option<u64> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("retry_after_ms")
        .and_then(|v| v.as_u64())
        .or_else(|| {
            value
                .get("retry_after")
                .and_then(|v| v.as_f64())
                .map(|secs| (secs * 1000.0) as u64)
        })
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("name", &self.config.name)
            .field("base_url", &self.config.base_url)
            .field("api_key", &"***")
            .finish()
    }
}
