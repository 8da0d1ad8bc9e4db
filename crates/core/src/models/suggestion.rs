use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::ids;

/// Priority level shared by AI suggestions and insight recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// An advisory record associated with exactly one project, stored in a side
/// table keyed by project id (kept out of the project record itself).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSuggestion {
    /// `ai_<millis>_<random8>`
    pub id: String,

    pub title: String,
    pub description: String,
    pub priority: Priority,

    /// Free-form suggestion category (e.g. "budget", "savings")
    #[serde(rename = "type")]
    pub kind: String,

    /// The suggested action, as shown to the user
    pub action: String,

    pub is_applied: bool,

    #[serde(default)]
    pub applied_at: Option<DateTime<Utc>>,
}

impl AiSuggestion {
    /// Build an unapplied suggestion from validated input, minting an `ai_` id.
    #[must_use]
    pub fn create(input: &NewSuggestion) -> Self {
        Self {
            id: ids::suggestion_id(),
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            priority: input.priority,
            kind: input.kind.clone(),
            action: input.action.clone(),
            is_applied: false,
            applied_at: None,
        }
    }

    /// Mark the suggestion applied, stamping `applied_at`.
    pub fn mark_applied(&mut self) {
        self.is_applied = true;
        self.applied_at = Some(Utc::now());
    }
}

/// Input for recording a suggestion. Validated before any I/O.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSuggestion {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub action: String,
}

impl NewSuggestion {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation(
                "Suggestion title must not be empty".into(),
            ));
        }
        Ok(())
    }
}
