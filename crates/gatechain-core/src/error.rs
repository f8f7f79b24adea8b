//! Pipeline error types.
//!
//! A gate rejection is not an error; it is
//! [`PipelineOutcome::Rejected`](crate::records::PipelineOutcome::Rejected).

use std::fmt;

use gatechain_llm::ProviderError;
use thiserror::Error;

/// The model-backed stage a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Stage 1: classify the raw input.
    Classify,
    /// Stage 2: resolve one concrete detail record.
    Resolve,
    /// Stage 3: phrase the confirmation.
    Synthesize,
}

impl Stage {
    /// Lower-case stage name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classify => "classify",
            Self::Resolve => "resolve",
            Self::Synthesize => "synthesize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The model call behind a stage failed: network, timeout, refusal, or a
    /// reply that did not match the stage's schema. Aborts the invocation.
    #[error("{stage} stage failed: {source}")]
    Upstream {
        /// Stage that made the failing call.
        stage: Stage,
        /// The underlying provider error.
        #[source]
        source: ProviderError,
    },

    /// Missing credentials, unknown model, or out-of-range settings.
    /// Only raised while building a pipeline, never mid-run.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PipelineError {
    /// Wrap a provider error from `stage`. Suitable for `map_err`.
    pub fn upstream(stage: Stage) -> impl FnOnce(ProviderError) -> Self {
        move |source| Self::Upstream { stage, source }
    }

    /// `true` for [`PipelineError::Upstream`].
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    /// The failing stage, if this is an upstream error.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Upstream { stage, .. } => Some(*stage),
            Self::Configuration(_) => None,
        }
    }
}

/// A convenience type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
