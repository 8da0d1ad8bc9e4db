use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex as AsyncMutex;

use super::connectivity::ConnectivityState;
use crate::errors::CoreError;
use crate::models::project::{NewProject, Project, ProjectUpdate};
use crate::models::transaction::{NewTransaction, Transaction, TransactionKind, TransactionUpdate};
use crate::remote::api::{DeleteReceipt, ProjectApi};
use crate::remote::session::{Credentials, SessionStore};
use crate::storage::store::LocalStore;

/// Per-project-id mutation locks. Two rapid mutations of the same project
/// serialize here instead of racing the read-modify-write of its sequences.
#[derive(Default)]
struct ProjectLocks {
    inner: StdMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ProjectLocks {
    fn for_id(&self, id: &str) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(id.to_string()).or_default().clone()
    }
}

/// Single entry point for all project/transaction operations.
///
/// Decides per call whether to use the backend or the local store:
/// remote-first with a write-through mirror while the backend is reachable,
/// graceful degradation to local-only otherwise. Owns the connectivity state
/// (one instance per orchestrator, never process-global) and the per-project
/// mutation locks.
pub struct SyncOrchestrator {
    api: Arc<dyn ProjectApi>,
    store: LocalStore,
    session: Arc<SessionStore>,
    connectivity: ConnectivityState,
    locks: ProjectLocks,
}

impl SyncOrchestrator {
    /// Probe the backend once and build an orchestrator with the observed
    /// availability — the optimistic startup probe.
    pub async fn connect(
        api: Arc<dyn ProjectApi>,
        store: LocalStore,
        session: Arc<SessionStore>,
    ) -> Self {
        let available = api.probe().await;
        tracing::info!(available, "startup backend probe");
        Self::with_availability(api, store, session, available)
    }

    /// Build with a known availability. Used by tests and embedders that
    /// probe on their own schedule.
    pub fn with_availability(
        api: Arc<dyn ProjectApi>,
        store: LocalStore,
        session: Arc<SessionStore>,
        backend_available: bool,
    ) -> Self {
        Self {
            api,
            store,
            session,
            connectivity: ConnectivityState::new(backend_available),
            locks: ProjectLocks::default(),
        }
    }

    #[must_use]
    pub fn backend_available(&self) -> bool {
        self.connectivity.is_available()
    }

    #[must_use]
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Explicit reachability re-check — the only path that flips
    /// availability back on.
    pub async fn probe_backend(&self) -> bool {
        let available = self.api.probe().await;
        if available {
            self.connectivity.mark_available();
        } else {
            self.connectivity.mark_unavailable();
        }
        tracing::debug!(available, "explicit backend probe");
        available
    }

    /// Install fresh credentials after an auth failure and lift the
    /// fail-fast latch.
    pub fn sign_in(&self, credentials: Credentials) {
        self.session.set(credentials);
        self.connectivity.restore_auth();
    }

    pub fn sign_out(&self) {
        self.session.clear();
    }

    // ── Failure policy ──────────────────────────────────────────────

    /// Once auth has been rejected, every operation fails fast until
    /// `sign_in` installs new credentials.
    fn ensure_auth(&self) -> Result<(), CoreError> {
        if self.connectivity.is_auth_revoked() {
            return Err(CoreError::AuthRequired);
        }
        Ok(())
    }

    /// Decide what a remote failure means: `None` — absorbed, fall through
    /// to the local store; `Some(err)` — propagate to the caller.
    fn absorb(&self, operation: &str, err: CoreError) -> Option<CoreError> {
        match &err {
            CoreError::AuthRequired => {
                tracing::warn!(operation, "auth rejected — tearing down session");
                self.session.clear();
                self.connectivity.revoke_auth();
                Some(err)
            }
            CoreError::NotFound(_) => {
                tracing::debug!(operation, %err, "remote target missing, using local store");
                None
            }
            _ if err.is_connectivity_failure() => {
                tracing::warn!(operation, %err, "backend unreachable, degrading to local store");
                self.connectivity.mark_unavailable();
                None
            }
            _ => Some(err),
        }
    }

    /// Best-effort write-through: a record missing from the local mirror is
    /// skipped, genuine storage faults still propagate.
    fn mirror(&self, operation: &str, result: Result<(), CoreError>) -> Result<(), CoreError> {
        match result {
            Ok(()) => Ok(()),
            Err(CoreError::NotFound(what)) => {
                tracing::debug!(operation, what, "mirror skipped, record absent locally");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn mirror_project(&self, project: &Project) -> Result<(), CoreError> {
        self.store.save_project(project.clone())?;
        self.store.refresh_progress(&project.id)?;
        Ok(())
    }

    // ── Projects ────────────────────────────────────────────────────

    pub async fn list_projects(&self) -> Result<Vec<Project>, CoreError> {
        self.ensure_auth()?;
        if self.connectivity.is_available() {
            match self.api.list_projects().await {
                Ok(projects) => {
                    for project in &projects {
                        self.mirror_project(project)?;
                    }
                    return Ok(projects);
                }
                Err(e) => {
                    if let Some(fatal) = self.absorb("list_projects", e) {
                        return Err(fatal);
                    }
                }
            }
        }
        self.store.list_projects()
    }

    /// Optimistic local commit first: the record exists even if the remote
    /// attempt dies mid-flight. On remote success the local record is
    /// replaced with the server-issued one and its side records re-keyed.
    pub async fn create_project(&self, input: &NewProject) -> Result<Project, CoreError> {
        self.ensure_auth()?;
        input.validate()?;
        let local = self.store.create_project(input)?;

        if self.connectivity.is_available() {
            match self.api.create_project(input).await {
                Ok(remote) => {
                    let lock = self.locks.for_id(&local.id);
                    let _guard = lock.lock().await;
                    return self.store.adopt_remote_identity(&local.id, remote);
                }
                Err(e) => {
                    if let Some(fatal) = self.absorb("create_project", e) {
                        return Err(fatal);
                    }
                }
            }
        }
        Ok(local)
    }

    pub async fn update_project(
        &self,
        id: &str,
        patch: &ProjectUpdate,
    ) -> Result<Project, CoreError> {
        self.ensure_auth()?;
        patch.validate()?;
        let lock = self.locks.for_id(id);
        let _guard = lock.lock().await;

        if self.connectivity.is_available() {
            match self.api.update_project(id, patch).await {
                Ok(remote) => {
                    self.mirror_project(&remote)?;
                    return Ok(remote);
                }
                Err(e) => {
                    if let Some(fatal) = self.absorb("update_project", e) {
                        return Err(fatal);
                    }
                }
            }
        }
        self.store.apply_update(id, patch)
    }

    pub async fn delete_project(&self, id: &str) -> Result<DeleteReceipt, CoreError> {
        self.ensure_auth()?;
        let lock = self.locks.for_id(id);
        let _guard = lock.lock().await;

        if self.connectivity.is_available() {
            match self.api.delete_project(id).await {
                Ok(receipt) => {
                    self.store.delete_project(id)?;
                    return Ok(receipt);
                }
                Err(e) => {
                    if let Some(fatal) = self.absorb("delete_project", e) {
                        return Err(fatal);
                    }
                }
            }
        }
        let deleted_id = self.store.delete_project(id)?;
        Ok(DeleteReceipt {
            success: true,
            deleted_id,
        })
    }

    // ── Transactions ────────────────────────────────────────────────

    pub async fn add_transaction(
        &self,
        project_id: &str,
        input: &NewTransaction,
        kind: TransactionKind,
    ) -> Result<Transaction, CoreError> {
        self.ensure_auth()?;
        input.validate()?;
        let lock = self.locks.for_id(project_id);
        let _guard = lock.lock().await;

        if self.connectivity.is_available() {
            match self.api.add_transaction(project_id, input, kind).await {
                Ok(tx) => {
                    self.mirror(
                        "add_transaction",
                        self.store.insert_transaction(project_id, tx.clone()),
                    )?;
                    return Ok(tx);
                }
                Err(e) => {
                    if let Some(fatal) = self.absorb("add_transaction", e) {
                        return Err(fatal);
                    }
                }
            }
        }
        self.store.add_transaction(project_id, input, kind)
    }

    pub async fn update_transaction(
        &self,
        project_id: &str,
        tx_id: &str,
        patch: &TransactionUpdate,
    ) -> Result<Transaction, CoreError> {
        self.ensure_auth()?;
        patch.validate()?;
        let lock = self.locks.for_id(project_id);
        let _guard = lock.lock().await;

        if self.connectivity.is_available() {
            match self.api.update_transaction(project_id, tx_id, patch).await {
                Ok(tx) => {
                    self.mirror(
                        "update_transaction",
                        self.store.replace_transaction(project_id, &tx),
                    )?;
                    return Ok(tx);
                }
                Err(e) => {
                    if let Some(fatal) = self.absorb("update_transaction", e) {
                        return Err(fatal);
                    }
                }
            }
        }
        self.store.update_transaction(project_id, tx_id, patch)
    }

    /// Deleting a transaction yields the updated parent project.
    pub async fn delete_transaction(
        &self,
        project_id: &str,
        tx_id: &str,
    ) -> Result<Project, CoreError> {
        self.ensure_auth()?;
        let lock = self.locks.for_id(project_id);
        let _guard = lock.lock().await;

        if self.connectivity.is_available() {
            match self.api.delete_transaction(project_id, tx_id).await {
                Ok(remote) => {
                    self.mirror_project(&remote)?;
                    return Ok(remote);
                }
                Err(e) => {
                    if let Some(fatal) = self.absorb("delete_transaction", e) {
                        return Err(fatal);
                    }
                }
            }
        }
        self.store.delete_transaction(project_id, tx_id)
    }
}
