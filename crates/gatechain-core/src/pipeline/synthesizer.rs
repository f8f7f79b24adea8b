//! Model-backed Stage 3 response synthesizer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use gatechain_llm::{ProviderError, StructuredModel, extract};

use crate::error::{PipelineError, Result, Stage};
use crate::pipeline::traits::ResponseSynthesizer;
use crate::records::{ConfirmationResult, DetailRecord};

/// Phrases a confirmation from a resolved [`DetailRecord`].
///
/// The model sees the whole record as a JSON object, not a prose summary of
/// it, so no field is lost on the way in.
pub struct LlmResponseSynthesizer {
    model: Arc<dyn StructuredModel>,
    prompt: String,
}

impl LlmResponseSynthesizer {
    /// Create a synthesizer using `prompt` as the system instruction.
    pub fn new(model: Arc<dyn StructuredModel>, prompt: impl Into<String>) -> Self {
        Self {
            model,
            prompt: prompt.into(),
        }
    }
}

#[async_trait]
impl ResponseSynthesizer for LlmResponseSynthesizer {
    async fn synthesize(&self, record: &DetailRecord) -> Result<ConfirmationResult> {
        let payload = serde_json::to_string(record)
            .map_err(|e| PipelineError::upstream(Stage::Synthesize)(ProviderError::Json(e)))?;
        debug!(record = %payload, "synthesizing confirmation");

        let confirmation: ConfirmationResult = extract(self.model.as_ref(), &self.prompt, &payload)
            .await
            .map_err(PipelineError::upstream(Stage::Synthesize))?;

        info!(
            has_link = confirmation.supplementary_link.is_some(),
            "confirmation ready"
        );
        Ok(confirmation)
    }
}
