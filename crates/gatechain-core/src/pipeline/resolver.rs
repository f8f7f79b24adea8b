//! Model-backed Stage 2 detail resolver.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use gatechain_llm::{StructuredModel, extract};

use crate::error::{PipelineError, Result, Stage};
use crate::pipeline::traits::DetailResolver;
use crate::records::DetailRecord;

/// Asks the model to pick one concrete instance that achieves a description.
pub struct LlmDetailResolver {
    model: Arc<dyn StructuredModel>,
    prompt: String,
}

impl LlmDetailResolver {
    /// Create a resolver using `prompt` as the system instruction.
    pub fn new(model: Arc<dyn StructuredModel>, prompt: impl Into<String>) -> Self {
        Self {
            model,
            prompt: prompt.into(),
        }
    }
}

#[async_trait]
impl DetailResolver for LlmDetailResolver {
    async fn resolve(&self, description: &str) -> Result<DetailRecord> {
        debug!(description = %description, "resolving detail");

        let record: DetailRecord = extract(self.model.as_ref(), &self.prompt, description)
            .await
            .map_err(PipelineError::upstream(Stage::Resolve))?;

        info!(name = %record.name, "detail resolved");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::ScriptedModel;
    use gatechain_llm::ProviderError;
    use serde_json::json;

    #[tokio::test]
    async fn receives_description_only() {
        let model = Arc::new(ScriptedModel::reply(json!({
            "name": "push-up",
            "detail": "3 sets of 12"
        })));
        let resolver = LlmDetailResolver::new(model.clone(), "Pick one exercise.");

        let record = resolver.resolve("build arm strength").await.unwrap();
        assert_eq!(
            record,
            DetailRecord {
                name: "push-up".into(),
                detail: "3 sets of 12".into(),
            }
        );

        let calls = model.calls();
        assert_eq!(calls[0].user, "build arm strength");
        assert_eq!(calls[0].schema, "DetailRecord");
    }

    #[tokio::test]
    async fn empty_name_is_upstream_error() {
        let model = Arc::new(ScriptedModel::reply(json!({ "name": "", "detail": "x" })));
        let resolver = LlmDetailResolver::new(model, "p");

        let err = resolver.resolve("d").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Resolve));
    }

    #[tokio::test]
    async fn refusal_is_upstream_error() {
        let model = Arc::new(ScriptedModel::new(vec![Err(ProviderError::Refused(
            "cannot help".into(),
        ))]));
        let resolver = LlmDetailResolver::new(model, "p");

        let err = resolver.resolve("d").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Upstream {
                stage: Stage::Resolve,
                source: ProviderError::Refused(_),
            }
        ));
    }
}
