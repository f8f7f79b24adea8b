//! Startup wiring: configuration in, ready-to-run driver out.
//!
//! Every check that can fail before the first model call happens here, so a
//! missing API key or an unroutable model surfaces as a
//! [`PipelineError::Configuration`] at startup rather than mid-run.

use std::sync::Arc;

use tracing::{debug, info};

use gatechain_llm::{OpenAiCompatProvider, ProviderModel, RetryConfig, RetryPolicy, StructuredModel};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::pipeline::driver::PipelineDriver;

/// Resolve the configured model to a provider and build the shared model
/// handle used by every stage.
///
/// The provider's API key is read from the environment once, here.
pub fn build_model(config: &PipelineConfig) -> Result<Arc<dyn StructuredModel>> {
    config.validate()?;

    let router = config.router();
    let (provider_config, model_name) = router.route(&config.model).ok_or_else(|| {
        PipelineError::Configuration(format!(
            "no provider for model '{}' (known providers: {})",
            config.model,
            router.providers().join(", ")
        ))
    })?;

    let provider = OpenAiCompatProvider::from_env(provider_config.clone()).map_err(|e| {
        PipelineError::Configuration(format!("{}: {e}", provider_config.name))
    })?;

    info!(
        provider = %provider_config.name,
        model = %model_name,
        "model resolved"
    );
    debug!(
        base_url = %provider_config.base_url,
        timeout_secs = provider_config.timeout().as_secs(),
        max_retries = config.retry.max_retries,
        "provider settings"
    );

    let provider = RetryPolicy::new(provider, RetryConfig::from(&config.retry));
    let model = ProviderModel::new(provider, model_name)
        .with_temperature(config.temperature)
        .with_strict(config.strict_schema);
    Ok(Arc::new(model))
}

/// Build a [`PipelineDriver`] backed by the configured provider.
pub fn build_driver(config: &PipelineConfig) -> Result<PipelineDriver> {
    let model = build_model(config)?;
    PipelineDriver::from_model(model, config)
}
