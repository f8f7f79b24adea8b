//! Provider connection settings and the built-in provider table.
//!
//! An [`LlmProviderConfig`] says where an OpenAI-compatible endpoint lives,
//! which environment variable carries its key, and which model prefix routes
//! to it.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Request timeout used when a provider does not set `timeout_secs`.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for a single OpenAI-compatible provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    /// Human-readable provider name (e.g. "openai", "groq").
    pub name: String,

    /// Base URL of the API (e.g. "https://api.openai.com/v1").
    pub base_url: String,

    /// Environment variable that holds the API key (e.g. "OPENAI_API_KEY").
    pub api_key_env: String,

    /// Prefix that routes a model string here. "openai/gpt-4o" matches
    /// "openai/" and is sent upstream as "gpt-4o".
    #[serde(default)]
    pub model_prefix: Option<String>,

    /// Model used when the caller names only the provider.
    #[serde(default)]
    pub default_model: Option<String>,

    /// Extra HTTP headers sent with every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl LlmProviderConfig {
    /// Effective request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

fn compat(
    name: &str,
    base_url: &str,
    api_key_env: &str,
    default_model: Option<&str>,
) -> LlmProviderConfig {
    LlmProviderConfig {
        name: name.into(),
        base_url: base_url.into(),
        api_key_env: api_key_env.into(),
        model_prefix: Some(format!("{name}/")),
        default_model: default_model.map(String::from),
        headers: HashMap::new(),
        timeout_secs: None,
    }
}

/// Returns the built-in provider configurations.
///
/// The first entry (`openai`) is the default route for unprefixed model names.
pub fn builtin_providers() -> Vec<LlmProviderConfig> {
    let mut anthropic = compat(
        "anthropic",
        "https://api.anthropic.com/v1",
        "ANTHROPIC_API_KEY",
        Some("claude-sonnet-4-5-20250514"),
    );
    anthropic
        .headers
        .insert("anthropic-version".into(), "2023-06-01".into());

    vec![
        compat(
            "openai",
            "https://api.openai.com/v1",
            "OPENAI_API_KEY",
            Some("gpt-4o"),
        ),
        anthropic,
        compat(
            "groq",
            "https://api.groq.com/openai/v1",
            "GROQ_API_KEY",
            Some("llama-3.1-70b-versatile"),
        ),
        compat(
            "deepseek",
            "https://api.deepseek.com/v1",
            "DEEPSEEK_API_KEY",
            Some("deepseek-chat"),
        ),
        compat(
            "mistral",
            "https://api.mistral.ai/v1",
            "MISTRAL_API_KEY",
            Some("mistral-large-latest"),
        ),
        compat(
            "together",
            "https://api.together.xyz/v1",
            "TOGETHER_API_KEY",
            None,
        ),
        compat(
            "openrouter",
            "https://openrouter.ai/api/v1",
            "OPENROUTER_API_KEY",
            None,
        ),
        compat(
            "gemini",
            "https://generativelanguage.googleapis.com/v1beta/openai",
            "GOOGLE_GEMINI_API_KEY",
            Some("gemini-2.5-flash"),
        ),
        compat("xai", "https://api.x.ai/v1", "XAI_API_KEY", Some("grok-3-mini")),
    ]
}
