//! Data contracts passed between pipeline stages.
//!
//! The three record types double as the JSON Schemas the model is asked to
//! fill. Their doc comments become schema descriptions, so they are written
//! for the model as much as for the reader.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use gatechain_llm::StructuredOutput;

/// Stage 1 output: whether the text describes an outcome in the target category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassificationResult {
    /// Normalized description of the desired outcome.
    pub description: String,
    /// Whether the text describes an outcome in the target category.
    pub category_flag: bool,
    /// Confidence score between 0 and 1.
    pub confidence: f64,
}

impl StructuredOutput for ClassificationResult {
    fn validate(&self) -> Result<(), String> {
        if self.description.trim().is_empty() {
            return Err("description must not be empty".into());
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "confidence must be within [0, 1], got {}",
                self.confidence
            ));
        }
        Ok(())
    }
}

/// Stage 2 output: one concrete instance that achieves the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetailRecord {
    /// Name of the chosen instance.
    pub name: String,
    /// Quantified recommendation: magnitude and repetitions, or duration.
    pub detail: String,
}

impl StructuredOutput for DetailRecord {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        Ok(())
    }
}

/// Stage 3 output and the pipeline's terminal result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfirmationResult {
    /// Natural language confirmation message.
    pub message: String,
    /// Supplementary link, if applicable.
    #[serde(default)]
    pub supplementary_link: Option<String>,
}

impl StructuredOutput for ConfirmationResult {
    fn validate(&self) -> Result<(), String> {
        if self.message.trim().is_empty() {
            return Err("message must not be empty".into());
        }
        Ok(())
    }
}

/// What a pipeline invocation returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// The gate passed and every stage completed.
    Accepted(ConfirmationResult),
    /// Classification succeeded but did not clear the gate.
    Rejected {
        /// Why the input was turned away.
        reason: String,
        /// Stage 1's category decision.
        category_flag: bool,
        /// Stage 1's confidence.
        confidence: f64,
    },
}

impl PipelineOutcome {
    /// `true` for [`PipelineOutcome::Accepted`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// The confirmation, when accepted.
    pub fn confirmation(&self) -> Option<&ConfirmationResult> {
        match self {
            Self::Accepted(c) => Some(c),
            Self::Rejected { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(description: &str, confidence: f64) -> ClassificationResult {
        ClassificationResult {
            description: description.into(),
            category_flag: true,
            confidence,
        }
    }

    #[test]
    fn classification_bounds_inclusive() {
        assert!(classification("x", 0.0).validate().is_ok());
        assert!(classification("x", 1.0).validate().is_ok());
        assert!(classification("x", 1.01).validate().is_err());
        assert!(classification("x", -0.1).validate().is_err());
        assert!(classification("x", f64::NAN).validate().is_err());
    }

    #[test]
    fn blank_description_rejected() {
        let err = classification("   ", 0.9).validate().unwrap_err();
        assert!(err.contains("description"));
    }

    #[test]
    fn detail_requires_name_only() {
        let ok = DetailRecord {
            name: "push-ups".into(),
            detail: String::new(),
        };
        assert!(ok.validate().is_ok());

        let blank = DetailRecord {
            name: "".into(),
            detail: "3 sets of 12".into(),
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn confirmation_link_is_optional() {
        let parsed: ConfirmationResult =
            serde_json::from_str(r#"{"message": "Let's go."}"#).unwrap();
        assert_eq!(parsed.supplementary_link, None);
        assert!(parsed.validate().is_ok());

        let empty = ConfirmationResult {
            message: "".into(),
            supplementary_link: Some("https://example.com".into()),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let rejected = PipelineOutcome::Rejected {
            reason: "gate check failed".into(),
            category_flag: false,
            confidence: 0.95,
        };
        let json = serde_json::to_value(&rejected).unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["confidence"], 0.95);
        assert!(!rejected.is_accepted());
        assert!(rejected.confirmation().is_none());

        let accepted = PipelineOutcome::Accepted(ConfirmationResult {
            message: "ok".into(),
            supplementary_link: None,
        });
        let json = serde_json::to_value(&accepted).unwrap();
        assert_eq!(json["outcome"], "accepted");
        assert_eq!(json["message"], "ok");
    }

    #[test]
    fn detail_record_schema_lists_both_fields() {
        let schema = gatechain_llm::OutputSchema::of::<DetailRecord>().unwrap();
        assert_eq!(schema.name, "DetailRecord");
        let required = schema.schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "name"));
        assert!(required.iter().any(|v| v == "detail"));
    }
}
