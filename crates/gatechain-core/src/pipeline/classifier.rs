//! Model-backed Stage 1 classifier.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use gatechain_llm::{StructuredModel, extract};

use crate::error::{PipelineError, Result, Stage};
use crate::pipeline::traits::Classifier;
use crate::records::ClassificationResult;

/// Asks the model for a single categorical decision about the input.
pub struct LlmClassifier {
    model: Arc<dyn StructuredModel>,
    prompt: String,
}

impl LlmClassifier {
    /// Create a classifier using `prompt` as the system instruction.
    pub fn new(model: Arc<dyn StructuredModel>, prompt: impl Into<String>) -> Self {
        Self {
            model,
            prompt: prompt.into(),
        }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, raw_text: &str) -> Result<ClassificationResult> {
        info!("starting outcome classification");
        debug!(input = %raw_text, "classifier input");

        let result: ClassificationResult = extract(self.model.as_ref(), &self.prompt, raw_text)
            .await
            .map_err(PipelineError::upstream(Stage::Classify))?;

        info!(
            category_flag = result.category_flag,
            confidence = format_args!("{:.2}", result.confidence),
            "classification complete"
        );
        Ok(result)
    }
}
