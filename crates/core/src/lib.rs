pub mod errors;
pub mod models;
pub mod remote;
pub mod services;
pub mod storage;

use std::sync::Arc;

use errors::CoreError;
use models::insights::ProjectInsights;
use models::progress::ProgressData;
use models::project::{NewProject, Project, ProjectUpdate};
use models::suggestion::{AiSuggestion, NewSuggestion};
use models::transaction::{NewTransaction, Transaction, TransactionKind, TransactionUpdate};
use remote::api::{DeleteReceipt, ProjectApi};
use remote::http::{RemoteClient, RemoteConfig};
use remote::session::{Credentials, SessionStore};
use services::insight_service::InsightService;
use services::sync_service::SyncOrchestrator;
use storage::backend::{FileBackend, KeyValueBackend};
use storage::store::LocalStore;

/// Main entry point for the LedgerSync core library.
///
/// Owns the session, the HTTP client, the per-tenant local store, and the
/// sync orchestrator. Project and transaction operations follow the
/// offline-first policy: remote-first with a write-through mirror while the
/// backend is reachable, local-only otherwise. Insights, derived progress,
/// and AI-suggestion records are served from the local store.
///
/// The local-store namespace binds to the tenant at construction; signing in
/// with a different tenant requires a fresh instance.
#[must_use]
pub struct LedgerSync {
    orchestrator: SyncOrchestrator,
    insight_service: InsightService,
}

impl LedgerSync {
    /// Connect with file-backed local storage under `data_dir`, probing the
    /// backend once (the optimistic startup probe).
    pub async fn connect(
        config: RemoteConfig,
        credentials: Credentials,
        data_dir: &str,
    ) -> Result<Self, CoreError> {
        let backend = FileBackend::new(data_dir)?;
        Ok(Self::connect_with_backend(config, credentials, Box::new(backend)).await)
    }

    /// Connect with a caller-supplied storage backend.
    pub async fn connect_with_backend(
        config: RemoteConfig,
        credentials: Credentials,
        backend: Box<dyn KeyValueBackend>,
    ) -> Self {
        let tenant_id = credentials.tenant_id.clone();
        let session = Arc::new(SessionStore::new(credentials));
        let api: Arc<dyn ProjectApi> = Arc::new(RemoteClient::new(config, Arc::clone(&session)));
        let store = LocalStore::new(backend, tenant_id);
        let orchestrator = SyncOrchestrator::connect(api, store, session).await;
        Self {
            orchestrator,
            insight_service: InsightService::new(),
        }
    }

    /// Assemble from parts without probing. Used by tests and embedders with
    /// custom transports.
    pub fn from_parts(
        api: Arc<dyn ProjectApi>,
        store: LocalStore,
        session: Arc<SessionStore>,
        backend_available: bool,
    ) -> Self {
        Self {
            orchestrator: SyncOrchestrator::with_availability(
                api,
                store,
                session,
                backend_available,
            ),
            insight_service: InsightService::new(),
        }
    }

    // ── Projects ────────────────────────────────────────────────────

    pub async fn list_projects(&self) -> Result<Vec<Project>, CoreError> {
        self.orchestrator.list_projects().await
    }

    pub async fn create_project(&self, input: &NewProject) -> Result<Project, CoreError> {
        self.orchestrator.create_project(input).await
    }

    pub async fn update_project(
        &self,
        id: &str,
        patch: &ProjectUpdate,
    ) -> Result<Project, CoreError> {
        self.orchestrator.update_project(id, patch).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<DeleteReceipt, CoreError> {
        self.orchestrator.delete_project(id).await
    }

    /// Read a single project from the local mirror.
    pub fn get_project(&self, id: &str) -> Result<Option<Project>, CoreError> {
        self.orchestrator.store().get_project(id)
    }

    // ── Transactions ────────────────────────────────────────────────

    pub async fn add_transaction(
        &self,
        project_id: &str,
        input: &NewTransaction,
        kind: TransactionKind,
    ) -> Result<Transaction, CoreError> {
        self.orchestrator
            .add_transaction(project_id, input, kind)
            .await
    }

    pub async fn update_transaction(
        &self,
        project_id: &str,
        tx_id: &str,
        patch: &TransactionUpdate,
    ) -> Result<Transaction, CoreError> {
        self.orchestrator
            .update_transaction(project_id, tx_id, patch)
            .await
    }

    pub async fn delete_transaction(
        &self,
        project_id: &str,
        tx_id: &str,
    ) -> Result<Project, CoreError> {
        self.orchestrator.delete_transaction(project_id, tx_id).await
    }

    // ── Derived data ────────────────────────────────────────────────

    /// The stored derived-metrics record for a project, if any.
    pub fn progress_for(&self, project_id: &str) -> Result<Option<ProgressData>, CoreError> {
        self.orchestrator.store().progress_for(project_id)
    }

    /// Heuristic health report, computed from the local mirror.
    pub fn insights(&self, project_id: &str) -> Result<ProjectInsights, CoreError> {
        let project = self
            .orchestrator
            .store()
            .get_project(project_id)?
            .ok_or_else(|| CoreError::NotFound(format!("project {project_id}")))?;
        Ok(self.insight_service.generate(&project))
    }

    // ── AI suggestions ──────────────────────────────────────────────

    pub fn suggestions_for(&self, project_id: &str) -> Result<Vec<AiSuggestion>, CoreError> {
        self.orchestrator.store().suggestions_for(project_id)
    }

    pub fn add_suggestion(
        &self,
        project_id: &str,
        input: &NewSuggestion,
    ) -> Result<AiSuggestion, CoreError> {
        self.orchestrator.store().add_suggestion(project_id, input)
    }

    pub fn apply_suggestion(
        &self,
        project_id: &str,
        suggestion_id: &str,
    ) -> Result<AiSuggestion, CoreError> {
        self.orchestrator
            .store()
            .apply_suggestion(project_id, suggestion_id)
    }

    // ── Connectivity & session ──────────────────────────────────────

    #[must_use]
    pub fn backend_available(&self) -> bool {
        self.orchestrator.backend_available()
    }

    /// Re-check backend reachability; the only path that flips availability
    /// back on after a degradation.
    pub async fn probe_backend(&self) -> bool {
        self.orchestrator.probe_backend().await
    }

    /// Install fresh credentials after an auth failure.
    pub fn sign_in(&self, credentials: Credentials) {
        self.orchestrator.sign_in(credentials);
    }

    pub fn sign_out(&self) {
        self.orchestrator.sign_out();
    }
}
