use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::suggestion::Priority;

/// Coarse health bucket derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectHealth {
    Healthy,
    NeedsAttention,
    Critical,
}

impl std::fmt::Display for ProjectHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectHealth::Healthy => write!(f, "healthy"),
            ProjectHealth::NeedsAttention => write!(f, "needs_attention"),
            ProjectHealth::Critical => write!(f, "critical"),
        }
    }
}

/// One entry of the prioritized recommendation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: Priority,
    pub message: String,
}

/// Heuristic health report for a single project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInsights {
    pub project_id: String,

    /// 0–100, anchored at 50
    pub health_score: u8,

    pub status: ProjectHealth,

    /// Natural-language one-liner for dashboards
    pub summary: String,

    /// Sorted high → low priority
    pub recommendations: Vec<Recommendation>,

    pub generated_at: DateTime<Utc>,
}
