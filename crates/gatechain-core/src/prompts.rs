//! System instructions for the three stages.
//!
//! The defaults target physical fitness: is the text a desired physical
//! outcome, which exercise achieves it, and how to phrase the suggestion.
//! Any other single-category domain can be plugged in through
//! [`StagePrompts`].

use serde::{Deserialize, Serialize};

/// Default Stage 1 instruction.
pub const CLASSIFY: &str = "Analyze if the text describes the intended outcome of a physical \
exercise. Set category_flag to true only if it does, give a confidence score between 0 and 1, \
and restate the desired outcome as a short description.";

/// Default Stage 2 instruction.
pub const RESOLVE: &str = "Find one type of physical exercise to achieve the intended outcome. \
Put its name in name, and in detail suggest the weight and reps, or the length of time.";

/// Default Stage 3 instruction.
pub const SYNTHESIZE: &str = "Generate a natural response to achieve the intended outcome via \
a specific physical exercise and a suggestion for the weight and reps or length of time. \
Include a supplementary link only if you know a relevant one.";

/// The system instruction sent with each stage's model call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagePrompts {
    /// Stage 1: category decision.
    pub classify: String,
    /// Stage 2: pick one concrete instance with a quantified recommendation.
    pub resolve: String,
    /// Stage 3: phrase the confirmation.
    pub synthesize: String,
}

impl Default for StagePrompts {
    fn default() -> Self {
        Self {
            classify: CLASSIFY.into(),
            resolve: RESOLVE.into(),
            synthesize: SYNTHESIZE.into(),
        }
    }
}

impl StagePrompts {
    /// Name of the first blank prompt, if any.
    pub fn first_blank(&self) -> Option<&'static str> {
        [
            ("classify", &self.classify),
            ("resolve", &self.resolve),
            ("synthesize", &self.synthesize),
        ]
        .into_iter()
        .find(|(_, p)| p.trim().is_empty())
        .map(|(name, _)| name)
    }
}
