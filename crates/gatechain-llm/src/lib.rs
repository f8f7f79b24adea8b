//! Model-call layer for gatechain.
//!
//! Talks to OpenAI-compatible chat completion endpoints and turns their
//! replies into validated, typed values.
//!
//! # Architecture
//!
//! - [`Provider`] defines raw chat completion
//! - [`OpenAiCompatProvider`] implements it for any OpenAI-compatible API
//! - [`RetryPolicy`] wraps a provider with exponential backoff
//! - [`ProviderRouter`] resolves "openai/gpt-4o" style names to a provider config
//! - [`StructuredModel`] is the schema-constrained call used by pipeline stages,
//!   with [`ProviderModel`] adapting any [`Provider`] to it
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gatechain_llm::{ProviderRouter, OpenAiCompatProvider, ProviderModel, extract};
//!
//! let router = ProviderRouter::with_builtins();
//! let (config, model_name) = router.route("openai/gpt-4o").unwrap();
//! let provider = OpenAiCompatProvider::from_env(config.clone())?;
//! let model = ProviderModel::new(provider, model_name);
//!
//! let pick: MyRecord = extract(&model, "Pick one exercise.", "stronger legs").await?;
//! ```

pub mod config;
pub mod error;
pub mod openai_compat;
pub mod provider;
pub mod retry;
pub mod router;
pub mod structured;
pub mod types;

pub use config::LlmProviderConfig;
pub use error::{ProviderError, Result};
pub use openai_compat::OpenAiCompatProvider;
pub use provider::Provider;
pub use retry::{RetryConfig, RetryPolicy};
pub use router::ProviderRouter;
pub use structured::{OutputSchema, ProviderModel, StructuredModel, StructuredOutput, extract};
pub use types::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat, Usage};
