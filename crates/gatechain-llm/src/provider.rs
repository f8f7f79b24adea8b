//! The [`Provider`] trait for chat completions.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChatRequest, ChatResponse};

/// A provider that can execute chat completion requests.
///
/// Implementations own the protocol details for one API: authentication,
/// request formatting, and mapping HTTP failures onto
/// [`ProviderError`](crate::error::ProviderError). The main implementation is
/// [`OpenAiCompatProvider`](crate::openai_compat::OpenAiCompatProvider).
#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns the provider name (e.g. "openai", "groq").
    fn name(&self) -> &str;

    /// Execute a chat completion request and return the response.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`](crate::error::ProviderError) on network
    /// failure, timeout, authentication problems, rate limiting, or an
    /// unparseable response.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;
}
