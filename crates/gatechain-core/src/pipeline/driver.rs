//! Sequential driver: classify -> gate -> resolve -> synthesize.

use std::sync::Arc;

use tracing::{info, warn};

use gatechain_llm::StructuredModel;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::pipeline::classifier::LlmClassifier;
use crate::pipeline::gate::Gate;
use crate::pipeline::resolver::LlmDetailResolver;
use crate::pipeline::synthesizer::LlmResponseSynthesizer;
use crate::pipeline::traits::{Classifier, DetailResolver, ResponseSynthesizer};
use crate::records::PipelineOutcome;

/// Reason carried by every gate rejection.
pub const REJECTION_REASON: &str = "gate check failed";

/// Runs the three model-backed stages in order with the gate after Stage 1.
///
/// Stages 2 and 3 are never invoked for rejected input, and an upstream
/// failure in any stage ends the run with no partial result.
pub struct PipelineDriver {
    classifier: Arc<dyn Classifier>,
    resolver: Arc<dyn DetailResolver>,
    synthesizer: Arc<dyn ResponseSynthesizer>,
    gate: Gate,
}

impl PipelineDriver {
    /// Assemble a driver from explicit stages.
    pub fn new(
        classifier: Arc<dyn Classifier>,
        resolver: Arc<dyn DetailResolver>,
        synthesizer: Arc<dyn ResponseSynthesizer>,
        gate: Gate,
    ) -> Self {
        Self {
            classifier,
            resolver,
            synthesizer,
            gate,
        }
    }

    /// Build the model-backed stages over one shared model.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Configuration`](crate::error::PipelineError::Configuration)
    /// when `config` does not validate.
    pub fn from_model(model: Arc<dyn StructuredModel>, config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let prompts = &config.prompts;
        Ok(Self::new(
            Arc::new(LlmClassifier::new(model.clone(), prompts.classify.clone())),
            Arc::new(LlmDetailResolver::new(model.clone(), prompts.resolve.clone())),
            Arc::new(LlmResponseSynthesizer::new(model, prompts.synthesize.clone())),
            Gate::new(config.threshold)?,
        ))
    }

    /// The gate applied after Stage 1.
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Run one input through the pipeline.
    ///
    /// Returns [`PipelineOutcome::Rejected`] when the gate does not pass;
    /// that is a normal result, not an error.
    pub async fn run(&self, raw_text: &str) -> Result<PipelineOutcome> {
        let classification = self.classifier.classify(raw_text).await?;

        if !self.gate.check(&classification) {
            warn!(
                category_flag = classification.category_flag,
                confidence = classification.confidence,
                threshold = self.gate.threshold(),
                "gate check failed"
            );
            return Ok(PipelineOutcome::Rejected {
                reason: REJECTION_REASON.into(),
                category_flag: classification.category_flag,
                confidence: classification.confidence,
            });
        }
        info!(confidence = classification.confidence, "gate passed");

        let record = self.resolver.resolve(&classification.description).await?;
        let confirmation = self.synthesizer.synthesize(&record).await?;

        info!("pipeline completed");
        Ok(PipelineOutcome::Accepted(confirmation))
    }
}

impl std::fmt::Debug for PipelineDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineDriver")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
