use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::ids;
use crate::models::transaction::{Transaction, TransactionKind};

/// Default currency assigned to projects that don't specify one.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Workflow status of a project. Drives the completion rate,
/// independently of financial progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Active => write!(f, "active"),
            ProjectStatus::Completed => write!(f, "completed"),
            ProjectStatus::OnHold => write!(f, "on-hold"),
        }
    }
}

/// A budgeted project owning its income/expense/tax sequences.
///
/// `id` never changes once assigned. `updated_at` strictly increases on
/// every mutation (see [`Project::touch`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Backend-issued id, or locally-minted `local_<millis>_<random8>`
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Planned budget in `currency`; positive when set
    #[serde(default)]
    pub budget: Option<f64>,

    /// ISO 4217 code (3 ASCII letters, uppercase)
    pub currency: String,

    pub status: ProjectStatus,

    /// Ordered transaction sequences; order is insertion order
    #[serde(default)]
    pub income: Vec<Transaction>,
    #[serde(default)]
    pub expenses: Vec<Transaction>,
    #[serde(default)]
    pub tax: Vec<Transaction>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Build a fresh local project from validated input, minting a local id
    /// and filling the documented defaults (empty sequences, `active`, INR).
    #[must_use]
    pub fn create(input: &NewProject) -> Self {
        let now = Utc::now();
        Self {
            id: ids::local_project_id(),
            name: input.name.trim().to_string(),
            description: input.description.clone().unwrap_or_default(),
            budget: input.budget,
            currency: input
                .currency
                .as_deref()
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            status: input.status.unwrap_or(ProjectStatus::Active),
            income: Vec::new(),
            expenses: Vec::new(),
            tax: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump `updated_at`. When the clock hasn't advanced past the previous
    /// value (same-millisecond mutations), advance by one millisecond so the
    /// timestamp stays strictly monotonic.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::milliseconds(1)
        };
    }

    /// Apply a partial update in place and bump `updated_at`.
    pub fn apply(&mut self, patch: &ProjectUpdate) {
        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(budget) = patch.budget {
            self.budget = Some(budget);
        }
        if let Some(currency) = &patch.currency {
            self.currency = currency.trim().to_uppercase();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.touch();
    }

    /// The sequence holding transactions of the given kind.
    #[must_use]
    pub fn transactions(&self, kind: TransactionKind) -> &[Transaction] {
        match kind {
            TransactionKind::Income => &self.income,
            TransactionKind::Expense => &self.expenses,
            TransactionKind::Tax => &self.tax,
        }
    }

    pub fn transactions_mut(&mut self, kind: TransactionKind) -> &mut Vec<Transaction> {
        match kind {
            TransactionKind::Income => &mut self.income,
            TransactionKind::Expense => &mut self.expenses,
            TransactionKind::Tax => &mut self.tax,
        }
    }

    /// Locate a transaction by id, scanning income → expenses → tax.
    /// First match wins; transaction ids are globally unique so the scan
    /// order only matters for determinism.
    #[must_use]
    pub fn find_transaction(&self, tx_id: &str) -> Option<(TransactionKind, usize)> {
        for kind in [
            TransactionKind::Income,
            TransactionKind::Expense,
            TransactionKind::Tax,
        ] {
            if let Some(idx) = self.transactions(kind).iter().position(|t| t.id == tx_id) {
                return Some((kind, idx));
            }
        }
        None
    }

    /// Sum of amounts in one sequence.
    #[must_use]
    pub fn total(&self, kind: TransactionKind) -> f64 {
        self.transactions(kind).iter().map(|t| t.amount).sum()
    }

    /// Net position: income − expenses − tax.
    #[must_use]
    pub fn net(&self) -> f64 {
        self.total(TransactionKind::Income)
            - self.total(TransactionKind::Expense)
            - self.total(TransactionKind::Tax)
    }
}

fn validate_budget(budget: Option<f64>) -> Result<(), CoreError> {
    if let Some(b) = budget {
        if !b.is_finite() || b <= 0.0 {
            return Err(CoreError::Validation(
                "Project budget must be positive when set".into(),
            ));
        }
    }
    Ok(())
}

fn validate_currency(currency: Option<&str>) -> Result<(), CoreError> {
    if let Some(c) = currency {
        let trimmed = c.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|ch| ch.is_ascii_alphabetic()) {
            return Err(CoreError::Validation(format!(
                "Invalid currency code '{c}': must be exactly 3 ASCII letters (e.g., INR, USD, EUR)"
            )));
        }
    }
    Ok(())
}

/// Input for creating a project. Validated before any I/O.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
}

impl NewProject {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("Project name must not be empty".into()));
        }
        validate_budget(self.budget)?;
        validate_currency(self.currency.as_deref())
    }
}

/// Partial update for an existing project. Validated before any I/O.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
}

impl ProjectUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(CoreError::Validation("Project name must not be empty".into()));
            }
        }
        validate_budget(self.budget)?;
        validate_currency(self.currency.as_deref())
    }
}
