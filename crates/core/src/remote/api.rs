use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::project::{NewProject, Project, ProjectUpdate};
use crate::models::transaction::{NewTransaction, Transaction, TransactionKind, TransactionUpdate};

/// Confirmation returned by the backend for a project delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReceipt {
    pub success: bool,
    #[serde(default)]
    pub deleted_id: Option<String>,
}

/// Trait abstraction over the backend REST surface.
///
/// The orchestrator depends on `dyn ProjectApi`, so the HTTP implementation
/// can be swapped for a mock in tests without touching the sync logic.
#[async_trait]
pub trait ProjectApi: Send + Sync {
    /// Lightweight reachability check. Never errors: a timeout or any
    /// status ≥ 500 means `false`.
    async fn probe(&self) -> bool;

    async fn list_projects(&self) -> Result<Vec<Project>, CoreError>;

    async fn create_project(&self, input: &NewProject) -> Result<Project, CoreError>;

    async fn update_project(&self, id: &str, patch: &ProjectUpdate) -> Result<Project, CoreError>;

    async fn delete_project(&self, id: &str) -> Result<DeleteReceipt, CoreError>;

    async fn add_transaction(
        &self,
        project_id: &str,
        input: &NewTransaction,
        kind: TransactionKind,
    ) -> Result<Transaction, CoreError>;

    async fn update_transaction(
        &self,
        project_id: &str,
        tx_id: &str,
        patch: &TransactionUpdate,
    ) -> Result<Transaction, CoreError>;

    /// Deleting a transaction returns the updated parent project.
    async fn delete_transaction(&self, project_id: &str, tx_id: &str)
        -> Result<Project, CoreError>;
}
