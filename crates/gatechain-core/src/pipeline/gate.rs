//! The acceptance gate between classification and the remaining stages.

use crate::error::{PipelineError, Result};
use crate::records::ClassificationResult;

/// Confidence a classification needs to pass when no threshold is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Accept iff the category flag is set and `confidence >= threshold`.
pub fn decide(result: &ClassificationResult, threshold: f64) -> bool {
    result.category_flag && result.confidence >= threshold
}

/// A [`decide`] with its threshold bound and range-checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gate {
    threshold: f64,
}

impl Gate {
    /// Create a gate. The threshold must lie in `[0, 1]`.
    pub fn new(threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PipelineError::Configuration(format!(
                "threshold must be within [0, 1], got {threshold}"
            )));
        }
        Ok(Self { threshold })
    }

    /// The bound threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Apply the gate.
    pub fn check(&self, result: &ClassificationResult) -> bool {
        decide(result, self.threshold)
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}
