//! Schema-constrained completions.
//!
//! A [`StructuredModel`] takes a system instruction, user content and an
//! [`OutputSchema`], and returns a JSON value the provider produced under that
//! schema. [`extract`] is the typed entry point: it derives the schema from
//! the target type, calls the model, then deserializes and validates the
//! reply. A reply that does not fit is a [`ProviderError::SchemaViolation`],
//! never a defaulted or partially filled value.

use std::borrow::Cow;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ProviderError, Result};
use crate::provider::Provider;
use crate::types::{ChatMessage, ChatRequest, JsonSchemaFormat, ResponseFormat};

/// A type a model can be asked to produce.
///
/// `validate` checks invariants the JSON Schema cannot express to every
/// provider (non-empty strings, numeric ranges). It runs once, right after
/// deserialization.
pub trait StructuredOutput: DeserializeOwned + JsonSchema + Send {
    /// Reject values that deserialize but break the type's invariants.
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// A named JSON Schema describing the expected reply.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    /// Schema name sent to the provider.
    pub name: String,
    /// JSON Schema document.
    pub schema: serde_json::Value,
}

impl OutputSchema {
    /// Derive the schema for `T`.
    pub fn of<T: JsonSchema>() -> Result<Self> {
        let mut schema = serde_json::to_value(schemars::schema_for!(T))?;
        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
        }
        Ok(Self {
            name: sanitize_name(&T::schema_name()),
            schema,
        })
    }
}

/// Providers only accept `[a-zA-Z0-9_-]` in schema names.
fn sanitize_name(raw: &Cow<'static, str>) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// The model-call seam: instruction + content + schema in, JSON out.
#[async_trait]
pub trait StructuredModel: Send + Sync {
    /// Ask the model for a reply conforming to `schema`.
    ///
    /// # Errors
    ///
    /// Any transport failure, a refusal, or a reply that is not JSON.
    async fn generate(
        &self,
        system: &str,
        user: &str,
        schema: &OutputSchema,
    ) -> Result<serde_json::Value>;
}

/// Call `model` and return a validated `T`.
pub async fn extract<T: StructuredOutput>(
    model: &dyn StructuredModel,
    system: &str,
    user: &str,
) -> Result<T> {
    let schema = OutputSchema::of::<T>()?;
    let value = model.generate(system, user, &schema).await?;
    decode(&schema, value)
}

/// Deserialize and validate a reply against the schema it was requested with.
pub fn decode<T: StructuredOutput>(schema: &OutputSchema, value: serde_json::Value) -> Result<T> {
    let violation = |reason: String| ProviderError::SchemaViolation {
        schema: schema.name.clone(),
        reason,
    };
    let parsed: T = serde_json::from_value(value).map_err(|e| violation(e.to_string()))?;
    parsed.validate().map_err(violation)?;
    Ok(parsed)
}

/// A [`StructuredModel`] backed by a chat completion [`Provider`].
pub struct ProviderModel<P> {
    provider: P,
    model: String,
    temperature: Option<f64>,
    strict: bool,
}

impl<P: Provider> ProviderModel<P> {
    /// Bind a provider to a model name.
    pub fn new(provider: P, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: None,
            strict: false,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Ask the provider to enforce the schema exactly.
    ///
    /// Strict mode requires every property to be listed as required, which
    /// optional fields do not satisfy on all providers.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn request(&self, system: &str, user: &str, schema: &OutputSchema) -> ChatRequest {
        let mut request = ChatRequest::new(
            self.model.clone(),
            vec![ChatMessage::system(system), ChatMessage::user(user)],
        );
        request.temperature = self.temperature;
        request.response_format = Some(ResponseFormat::JsonSchema {
            json_schema: JsonSchemaFormat {
                name: schema.name.clone(),
                schema: schema.schema.clone(),
                strict: self.strict.then_some(true),
            },
        });
        request
    }
}

#[async_trait]
impl<P: Provider> StructuredModel for ProviderModel<P> {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        schema: &OutputSchema,
    ) -> Result<serde_json::Value> {
        let request = self.request(system, user, schema);
        let response = self.provider.complete(&request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("response has no choices".into()))?;

        if let Some(refusal) = choice.message.refusal {
            return Err(ProviderError::Refused(refusal));
        }

        if choice.finish_reason.as_deref() == Some("length") {
            return Err(ProviderError::InvalidResponse(
                "reply truncated at token limit".into(),
            ));
        }

        let body = strip_markdown_fences(&choice.message.content);
        debug!(
            provider = %self.provider.name(),
            schema = %schema.name,
            bytes = body.len(),
            "structured reply received"
        );

        serde_json::from_str(body)
            .map_err(|e| ProviderError::InvalidResponse(format!("reply is not JSON: {e}")))
    }
}

impl<P: std::fmt::Debug> std::fmt::Debug for ProviderModel<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderModel")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("strict", &self.strict)
            .finish()
    }
}

/// Unwrap a reply fenced as a markdown code block.
fn strip_markdown_fences(input: &str) -> &str {
    let trimmed = input.trim();
    let Some(after_open) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    else {
        return trimmed;
    };
    after_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(after_open)
        .trim()
}
