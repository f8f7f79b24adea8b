//! Gated three-stage pipeline.
//!
//! Stages: Classifier -> Gate -> DetailResolver -> ResponseSynthesizer

pub mod traits;
pub mod classifier;
pub mod gate;
pub mod resolver;
pub mod synthesizer;
pub mod driver;

#[cfg(test)]
pub(crate) mod testing;
