use chrono::Utc;

use crate::models::insights::{ProjectHealth, ProjectInsights, Recommendation};
use crate::models::project::Project;
use crate::models::suggestion::Priority;
use crate::models::transaction::TransactionKind;

/// Computes the heuristic per-project health report.
///
/// Pure business logic — no I/O, no API calls. Easy to test.
pub struct InsightService;

impl InsightService {
    pub fn new() -> Self {
        Self
    }

    /// Score a project and derive its health status, summary, and
    /// prioritized recommendation list.
    ///
    /// The score is anchored at 50. Bonus rules apply while the project is
    /// net positive (+20 for the positive net, +15 for utilization below
    /// 80%, +10 for recorded income, +5 for recorded expenses); penalty
    /// rules apply while it is net negative (−25 for the negative net, −20
    /// for utilization above 95%, −10 for missing income). A flat project
    /// stays at the anchor. The result is clamped to [0, 100].
    #[must_use]
    pub fn generate(&self, project: &Project) -> ProjectInsights {
        let spent = project.total(TransactionKind::Expense);
        let net = project.net();
        let budget = project.budget.unwrap_or(0.0);
        let utilization = if budget > 0.0 {
            spent / budget * 100.0
        } else {
            0.0
        };
        let has_income = !project.income.is_empty();
        let has_expenses = !project.expenses.is_empty();

        let mut score: i32 = 50;
        if net > 0.0 {
            score += 20;
            if utilization < 80.0 {
                score += 15;
            }
            if has_income {
                score += 10;
            }
            if has_expenses {
                score += 5;
            }
        } else if net < 0.0 {
            score -= 25;
            if utilization > 95.0 {
                score -= 20;
            }
            if !has_income {
                score -= 10;
            }
        }
        let health_score = score.clamp(0, 100) as u8;

        let status = if health_score >= 70 {
            ProjectHealth::Healthy
        } else if health_score >= 40 {
            ProjectHealth::NeedsAttention
        } else {
            ProjectHealth::Critical
        };

        ProjectInsights {
            project_id: project.id.clone(),
            health_score,
            status,
            summary: Self::summarize(project, status, net, budget, utilization),
            recommendations: Self::recommend(net, budget, utilization, has_income, has_expenses),
            generated_at: Utc::now(),
        }
    }

    fn summarize(
        project: &Project,
        status: ProjectHealth,
        net: f64,
        budget: f64,
        utilization: f64,
    ) -> String {
        let phrase = match status {
            ProjectHealth::Healthy => "on track",
            ProjectHealth::NeedsAttention => "needs attention",
            ProjectHealth::Critical => "in critical shape",
        };
        let budget_phrase = if budget > 0.0 {
            format!("{utilization:.0}% of the budget used")
        } else {
            "no budget set".to_string()
        };
        format!(
            "{} is {}: net {:+.2} {} with {}.",
            project.name, phrase, net, project.currency, budget_phrase
        )
    }

    /// Fixed rule table, emitted high → low priority.
    fn recommend(
        net: f64,
        budget: f64,
        utilization: f64,
        has_income: bool,
        has_expenses: bool,
    ) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if net < 0.0 {
            recommendations.push(Recommendation {
                priority: Priority::High,
                message: "Spending exceeds recorded income; cut expenses or record missing income."
                    .into(),
            });
        }
        if budget > 0.0 && utilization > 95.0 {
            recommendations.push(Recommendation {
                priority: Priority::High,
                message: format!(
                    "Budget nearly exhausted ({utilization:.0}% used); raise the budget or pause spending."
                ),
            });
        } else if budget > 0.0 && utilization >= 80.0 {
            recommendations.push(Recommendation {
                priority: Priority::Medium,
                message: format!(
                    "Budget utilization at {utilization:.0}%; review upcoming expenses."
                ),
            });
        }
        if !has_income {
            recommendations.push(Recommendation {
                priority: Priority::Medium,
                message: "No income recorded; add funding entries so progress tracking is meaningful."
                    .into(),
            });
        }
        if budget <= 0.0 {
            recommendations.push(Recommendation {
                priority: Priority::Medium,
                message: "No budget set; set one to unlock utilization tracking.".into(),
            });
        }
        if !has_expenses && has_income {
            recommendations.push(Recommendation {
                priority: Priority::Low,
                message: "No expenses recorded yet; log spending as it happens.".into(),
            });
        }
        if recommendations.is_empty() {
            recommendations.push(Recommendation {
                priority: Priority::Low,
                message: "Finances look balanced; keep records up to date.".into(),
            });
        }

        recommendations.sort_by_key(|r| r.priority);
        recommendations
    }
}

impl Default for InsightService {
    fn default() -> Self {
        Self::new()
    }
}
