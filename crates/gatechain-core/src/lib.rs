//! Gated extraction and confirmation pipeline.
//!
//! Free-form text is classified by a model; only input that clears a
//! confidence gate is resolved into a concrete recommendation and phrased
//! as a confirmation.
//!
//! # Modules
//!
//! - [`pipeline`] -- stage traits, model-backed stages, the gate and the driver
//! - [`records`] -- typed records passed between stages
//! - [`config`] -- file-backed pipeline configuration
//! - [`prompts`] -- default stage instructions
//! - [`bootstrap`] -- builds a ready driver from configuration
//! - [`error`] -- pipeline error types

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod records;

pub use bootstrap::{build_driver, build_model};
pub use config::PipelineConfig;
pub use error::{PipelineError, Result, Stage};
pub use pipeline::driver::{PipelineDriver, REJECTION_REASON};
pub use pipeline::gate::{DEFAULT_THRESHOLD, Gate, decide};
pub use records::{ClassificationResult, ConfirmationResult, DetailRecord, PipelineOutcome};
