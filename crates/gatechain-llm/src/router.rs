//! Prefix-based model-to-provider routing.
//!
//! [`ProviderRouter`] maps a model string such as "groq/llama-3.1-70b-versatile"
//! to the provider whose prefix it carries, and strips the prefix.

use crate::config::{self, LlmProviderConfig};

/// Routes model names to provider configurations by prefix.
///
/// Unprefixed names go to the first configured provider unchanged. A bare
/// prefix ("openai/") resolves to that provider's default model.
#[derive(Debug, Clone)]
pub struct ProviderRouter {
    configs: Vec<LlmProviderConfig>,
    /// `(prefix, index into configs)`, longest prefix first.
    prefix_map: Vec<(String, usize)>,
}

impl ProviderRouter {
    /// Create a router from provider configurations. The first is the default.
    pub fn from_configs(configs: Vec<LlmProviderConfig>) -> Self {
        let mut prefix_map: Vec<(String, usize)> = configs
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.model_prefix.clone().map(|p| (p, i)))
            .collect();
        prefix_map.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            configs,
            prefix_map,
        }
    }

    /// Create a router over the built-in providers.
    pub fn with_builtins() -> Self {
        Self::from_configs(config::builtin_providers())
    }

    /// Resolve a model string to a provider config and the upstream model name.
    ///
    /// Returns `None` when no provider is configured, or when the resolved
    /// model name is empty and the provider has no default.
    pub fn route(&self, model: &str) -> Option<(&LlmProviderConfig, String)> {
        let (config, rest) = self
            .prefix_map
            .iter()
            .find_map(|(prefix, i)| {
                model
                    .strip_prefix(prefix.as_str())
                    .map(|rest| (&self.configs[*i], rest))
            })
            .or_else(|| self.configs.first().map(|c| (c, model)))?;

        let model_name = if rest.is_empty() {
            config.default_model.clone()?
        } else {
            rest.to_string()
        };
        Some((config, model_name))
    }

    /// Names of all configured providers, sorted.
    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.configs.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}
