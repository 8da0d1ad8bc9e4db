use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::project::{Project, ProjectStatus};
use crate::models::transaction::TransactionKind;

/// Money-side progress figures derived from a project's sequences and budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProgress {
    /// The project budget, 0.0 when unset
    pub total_budget: f64,

    /// Sum of all expense amounts
    pub spent: f64,

    /// income − expenses − tax
    pub remaining: f64,

    /// spent / budget × 100, 0.0 when the budget is unset or zero
    pub percentage: f64,
}

/// Derived per-project metrics. Never edited directly — recomputed through
/// [`ProgressData::for_project`] after every transaction mutation and stored
/// as a side record keyed by project id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
    pub financial_progress: FinancialProgress,

    /// Workflow completion: completed → 100, on-hold → 50, else 0.
    /// Intentionally NOT derived from the financial percentage — completion
    /// tracks workflow status, not spend.
    pub completion_rate: u8,

    pub last_updated: DateTime<Utc>,
}

impl ProgressData {
    /// A zeroed block for a project with no recorded transactions yet.
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            financial_progress: FinancialProgress {
                total_budget: 0.0,
                spent: 0.0,
                remaining: 0.0,
                percentage: 0.0,
            },
            completion_rate: 0,
            last_updated: Utc::now(),
        }
    }

    /// Recompute all derived figures from the project's current state.
    #[must_use]
    pub fn for_project(project: &Project) -> Self {
        let budget = project.budget.unwrap_or(0.0);
        let spent = project.total(TransactionKind::Expense);
        let remaining = project.net();
        let percentage = if budget > 0.0 {
            spent / budget * 100.0
        } else {
            0.0
        };
        let completion_rate = match project.status {
            ProjectStatus::Completed => 100,
            ProjectStatus::OnHold => 50,
            ProjectStatus::Active => 0,
        };

        Self {
            financial_progress: FinancialProgress {
                total_budget: budget,
                spent,
                remaining,
                percentage,
            },
            completion_rate,
            last_updated: Utc::now(),
        }
    }
}
