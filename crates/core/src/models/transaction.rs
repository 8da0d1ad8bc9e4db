use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::ids;

/// Which of the three project sequences a transaction belongs to.
/// Stored per-record as well, redundantly with the containing sequence,
/// because the backend keeps it that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Tax,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
            TransactionKind::Tax => write!(f, "tax"),
        }
    }
}

/// Lifecycle state of a transaction. Records are committed on creation;
/// there is no pending/failed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A single income/expense/tax record owned by its parent project.
///
/// **Note on precision**: amounts are stored as `f64` (~15-17 significant
/// digits), matching the backend's JSON numbers. Repeated arithmetic may
/// accumulate small floating-point errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier: backend-issued, or locally-minted `tx_<millis>_<random8>`
    pub id: String,

    /// What the money was for (never empty)
    pub description: String,

    /// Amount in the project's currency (always positive)
    pub amount: f64,

    /// Date of the transaction (daily granularity)
    pub date: NaiveDate,

    /// Free-form category label
    #[serde(default = "default_category")]
    pub category: String,

    /// Income/expense/tax — mirrors the sequence this record lives in
    #[serde(rename = "type")]
    pub kind: TransactionKind,

    /// Always `completed` after creation
    pub status: TransactionStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

fn default_category() -> String {
    "general".to_string()
}

impl Transaction {
    /// Build a committed transaction from validated input, minting a local id.
    #[must_use]
    pub fn create(input: &NewTransaction, kind: TransactionKind) -> Self {
        Self {
            id: ids::transaction_id(),
            description: input.description.trim().to_string(),
            amount: input.amount,
            date: input.date.unwrap_or_else(|| Utc::now().date_naive()),
            category: input
                .category
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(default_category),
            kind,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        }
    }

    /// Apply a partial update in place. Fields absent from the patch are untouched.
    pub fn apply(&mut self, patch: &TransactionUpdate) {
        if let Some(description) = &patch.description {
            self.description = description.trim().to_string();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(category) = &patch.category {
            self.category = category.trim().to_string();
        }
    }
}

/// Input for creating a transaction. Validated before any I/O.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.description.trim().is_empty() {
            return Err(CoreError::Validation(
                "Transaction description must not be empty".into(),
            ));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(CoreError::Validation(
                "Transaction amount must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Partial update for an existing transaction. Validated before any I/O.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<String>,
}

impl TransactionUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(CoreError::Validation(
                    "Transaction description must not be empty".into(),
                ));
            }
        }
        if let Some(amount) = self.amount {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(CoreError::Validation(
                    "Transaction amount must be positive".into(),
                ));
            }
        }
        Ok(())
    }
}
