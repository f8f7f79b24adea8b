//! Stage trait definitions.
//!
//! The pipeline stages in order:
//! 1. **[`Classifier`]** -- decide whether raw text is in the target category
//! 2. **[`Gate`](super::gate::Gate)** -- pure accept/reject on the classification
//! 3. **[`DetailResolver`]** -- choose one concrete instance with a quantified detail
//! 4. **[`ResponseSynthesizer`]** -- phrase the confirmation
//!
//! Each model-backed stage is a trait so the driver can be tested with
//! scripted stages and run against any model backend.

use async_trait::async_trait;

use crate::error::Result;
use crate::records::{ClassificationResult, ConfirmationResult, DetailRecord};

/// Stage 1: classify free-form input.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Produce a validated classification of `raw_text`.
    async fn classify(&self, raw_text: &str) -> Result<ClassificationResult>;
}

/// Stage 2: resolve a normalized description into one concrete record.
#[async_trait]
pub trait DetailResolver: Send + Sync {
    /// Pick a single instance that achieves `description`.
    async fn resolve(&self, description: &str) -> Result<DetailRecord>;
}

/// Stage 3: turn the resolved record into a user-facing confirmation.
#[async_trait]
pub trait ResponseSynthesizer: Send + Sync {
    /// Phrase a confirmation from the full record.
    async fn synthesize(&self, record: &DetailRecord) -> Result<ConfirmationResult>;
}
