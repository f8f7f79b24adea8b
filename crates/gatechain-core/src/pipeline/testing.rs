//! Scripted model for stage tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use gatechain_llm::{OutputSchema, ProviderError, StructuredModel};

/// One recorded `generate` call.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub system: String,
    pub user: String,
    pub schema: String,
}

/// Returns queued replies in order and records every call.
pub(crate) struct ScriptedModel {
    replies: Mutex<VecDeque<Result<serde_json::Value, ProviderError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<serde_json::Value, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(value: serde_json::Value) -> Self {
        Self::new(vec![Ok(value)])
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StructuredModel for ScriptedModel {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        schema: &OutputSchema,
    ) -> Result<serde_json::Value, ProviderError> {
        self.calls.lock().unwrap().push(Call {
            system: system.into(),
            user: user.into(),
            schema: schema.name.clone(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::RequestFailed("script exhausted".into())))
    }
}
