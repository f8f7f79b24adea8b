//! Pipeline configuration.
//!
//! [`PipelineConfig`] is deserialized from a JSON file; every field is
//! optional and falls back to its default.
//!
//! ```json
//! {
//!   "model": "openai/gpt-4o",
//!   "threshold": 0.7,
//!   "retry": { "max_retries": 2 },
//!   "prompts": { "classify": "Is this a cooking goal?" },
//!   "providers": [
//!     { "name": "local", "base_url": "http://localhost:11434/v1",
//!       "api_key_env": "LOCAL_API_KEY", "model_prefix": "local/" }
//!   ]
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use gatechain_llm::config::{LlmProviderConfig, builtin_providers};
use gatechain_llm::{ProviderRouter, RetryConfig};

use crate::error::{PipelineError, Result};
use crate::pipeline::gate::DEFAULT_THRESHOLD;
use crate::prompts::StagePrompts;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o";

/// Everything needed to build a [`PipelineDriver`](crate::pipeline::driver::PipelineDriver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Prefix-routed model name, e.g. "openai/gpt-4o" or "groq/llama-3.1-70b-versatile".
    pub model: String,

    /// Minimum Stage 1 confidence for the gate to pass.
    pub threshold: f64,

    /// Sampling temperature for every stage.
    pub temperature: Option<f64>,

    /// Ask providers to enforce schemas strictly.
    pub strict_schema: bool,

    /// Transport retry settings.
    pub retry: RetrySettings,

    /// Stage system instructions.
    pub prompts: StagePrompts,

    /// Additional providers, or replacements for built-ins with the same name.
    pub providers: Vec<LlmProviderConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            threshold: DEFAULT_THRESHOLD,
            temperature: None,
            strict_schema: false,
            retry: RetrySettings::default(),
            prompts: StagePrompts::default(),
            providers: Vec::new(),
        }
    }
}

/// Retry settings in file-friendly units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            max_retries: defaults.max_retries,
            base_delay_ms: defaults.base_delay.as_millis() as u64,
            max_delay_ms: defaults.max_delay.as_millis() as u64,
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            ..RetryConfig::default()
        }
    }
}

impl PipelineConfig {
    /// Load a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
            .map_err(|e| PipelineError::Configuration(format!("{}: {e}", path.display())))
    }

    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check ranges and required values.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(PipelineError::Configuration(msg));

        if self.model.trim().is_empty() {
            return invalid("model must not be empty".into());
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return invalid(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            ));
        }
        if let Some(t) = self.temperature
            && !(0.0..=2.0).contains(&t)
        {
            return invalid(format!("temperature must be within [0, 2], got {t}"));
        }
        if let Some(provider) = self.providers.iter().find(|p| p.timeout_secs == Some(0)) {
            return invalid(format!(
                "timeout_secs for provider {} must be greater than zero",
                provider.name
            ));
        }
        if let Some(stage) = self.prompts.first_blank() {
            return invalid(format!("prompt for {stage} stage must not be empty"));
        }
        Ok(())
    }

    /// Built-in providers merged with the configured ones.
    ///
    /// A configured provider replaces the built-in with the same name in
    /// place; new names are appended, so the default route stays first.
    pub fn router(&self) -> ProviderRouter {
        let mut configs = builtin_providers();
        for custom in &self.providers {
            match configs.iter_mut().find(|c| c.name == custom.name) {
                Some(existing) => *existing = custom.clone(),
                None => configs.push(custom.clone()),
            }
        }
        ProviderRouter::from_configs(configs)
    }
}
