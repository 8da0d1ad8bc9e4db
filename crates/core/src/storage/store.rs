use super::backend::KeyValueBackend;
use crate::errors::CoreError;
use crate::models::ids;
use crate::models::progress::ProgressData;
use crate::models::project::{NewProject, Project, ProjectUpdate, DEFAULT_CURRENCY};
use crate::models::suggestion::{AiSuggestion, NewSuggestion};
use crate::models::transaction::{NewTransaction, Transaction, TransactionKind, TransactionUpdate};

/// Per-tenant durable record storage.
///
/// Layout (all values JSON, all keys tenant-prefixed so nothing leaks across
/// tenants on a shared device):
/// - `<tenant>:projects` — the project index, an array in insertion order
/// - `<tenant>:progress:<id>` — one derived-data record per project
/// - `<tenant>:suggestions:<id>` — AI-suggestion side table per project
///
/// While the backend is unreachable this store is the authoritative system of
/// record; when it is reachable, the store is a best-effort write-through
/// mirror.
pub struct LocalStore {
    backend: Box<dyn KeyValueBackend>,
    tenant_id: String,
}

impl LocalStore {
    pub fn new(backend: Box<dyn KeyValueBackend>, tenant_id: impl Into<String>) -> Self {
        Self {
            backend,
            tenant_id: tenant_id.into(),
        }
    }

    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    // ── Keys ────────────────────────────────────────────────────────

    fn projects_key(&self) -> String {
        format!("{}:projects", self.tenant_id)
    }

    fn progress_key(&self, project_id: &str) -> String {
        format!("{}:progress:{}", self.tenant_id, project_id)
    }

    fn suggestions_key(&self, project_id: &str) -> String {
        format!("{}:suggestions:{}", self.tenant_id, project_id)
    }

    // ── Index I/O ───────────────────────────────────────────────────

    fn read_index(&self) -> Result<Vec<Project>, CoreError> {
        match self.backend.read(&self.projects_key())? {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| CoreError::Deserialization(format!("corrupt project index: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    fn write_index(&self, projects: &[Project]) -> Result<(), CoreError> {
        let json = serde_json::to_string(projects)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        self.backend.write(&self.projects_key(), &json)
    }

    fn write_progress(&self, project: &Project) -> Result<ProgressData, CoreError> {
        let progress = ProgressData::for_project(project);
        let json = serde_json::to_string(&progress)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        self.backend.write(&self.progress_key(&project.id), &json)?;
        Ok(progress)
    }

    // ── Projects ────────────────────────────────────────────────────

    /// All projects for the active tenant, in insertion order (which is not
    /// guaranteed chronological by `created_at`).
    pub fn list_projects(&self) -> Result<Vec<Project>, CoreError> {
        self.read_index()
    }

    pub fn get_project(&self, id: &str) -> Result<Option<Project>, CoreError> {
        Ok(self.read_index()?.into_iter().find(|p| p.id == id))
    }

    /// Validate, mint a local id, and persist a brand new project with its
    /// zeroed derived-data record.
    pub fn create_project(&self, input: &NewProject) -> Result<Project, CoreError> {
        input.validate()?;
        let project = Project::create(input);
        let mut index = self.read_index()?;
        index.push(project.clone());
        self.write_index(&index)?;
        self.write_progress(&project)?;
        Ok(project)
    }

    /// Upsert by id: an existing record keeps its index slot, a new one is
    /// appended. An empty id mints a fresh local one; an empty currency falls
    /// back to the default. `updated_at` always bumps, and a zeroed derived
    /// block is written only when none exists yet, so repeated saves with the
    /// same id stay idempotent.
    pub fn save_project(&self, mut project: Project) -> Result<Project, CoreError> {
        if project.id.trim().is_empty() {
            project.id = ids::local_project_id();
        }
        if project.currency.trim().is_empty() {
            project.currency = DEFAULT_CURRENCY.to_string();
        }
        project.touch();

        let mut index = self.read_index()?;
        match index.iter().position(|p| p.id == project.id) {
            Some(idx) => index[idx] = project.clone(),
            None => index.push(project.clone()),
        }
        self.write_index(&index)?;

        if self.backend.read(&self.progress_key(&project.id))?.is_none() {
            let zeroed = serde_json::to_string(&ProgressData::zeroed())
                .map_err(|e| CoreError::Serialization(e.to_string()))?;
            self.backend.write(&self.progress_key(&project.id), &zeroed)?;
        }
        Ok(project)
    }

    /// Field-wise patch; recomputes the derived record since budget and
    /// status changes move the percentage and completion rate.
    pub fn apply_update(&self, id: &str, patch: &ProjectUpdate) -> Result<Project, CoreError> {
        patch.validate()?;
        let mut index = self.read_index()?;
        let Some(idx) = index.iter().position(|p| p.id == id) else {
            return Err(CoreError::NotFound(format!("project {id}")));
        };
        index[idx].apply(patch);
        let project = index[idx].clone();
        self.write_index(&index)?;
        self.write_progress(&project)?;
        Ok(project)
    }

    /// Remove a project together with its derived-data and suggestion
    /// records. Silent no-op when the id is unknown — deletes arrive
    /// opportunistically as mirrors of remote deletes that may already have
    /// happened here.
    pub fn delete_project(&self, id: &str) -> Result<Option<String>, CoreError> {
        let mut index = self.read_index()?;
        let Some(idx) = index.iter().position(|p| p.id == id) else {
            tracing::debug!(project = id, "delete for unknown project ignored");
            return Ok(None);
        };
        index.remove(idx);
        self.write_index(&index)?;
        self.backend.remove(&self.progress_key(id))?;
        self.backend.remove(&self.suggestions_key(id))?;
        Ok(Some(id.to_string()))
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Mint a transaction id, append to the sequence selected by `kind`, and
    /// recompute the derived record.
    pub fn add_transaction(
        &self,
        project_id: &str,
        input: &NewTransaction,
        kind: TransactionKind,
    ) -> Result<Transaction, CoreError> {
        input.validate()?;
        let tx = Transaction::create(input, kind);
        self.insert_transaction(project_id, tx.clone())?;
        Ok(tx)
    }

    /// Append an already-built transaction. Mirroring a remote add goes
    /// through here so the server-issued id is kept.
    pub fn insert_transaction(&self, project_id: &str, tx: Transaction) -> Result<(), CoreError> {
        let mut index = self.read_index()?;
        let Some(idx) = index.iter().position(|p| p.id == project_id) else {
            return Err(CoreError::NotFound(format!("project {project_id}")));
        };
        index[idx].transactions_mut(tx.kind).push(tx);
        index[idx].touch();
        let project = index[idx].clone();
        self.write_index(&index)?;
        self.write_progress(&project)?;
        Ok(())
    }

    /// Patch a transaction located by scanning income → expenses → tax.
    /// `NotFound` when the id is absent from all three.
    pub fn update_transaction(
        &self,
        project_id: &str,
        tx_id: &str,
        patch: &TransactionUpdate,
    ) -> Result<Transaction, CoreError> {
        patch.validate()?;
        let mut index = self.read_index()?;
        let Some(idx) = index.iter().position(|p| p.id == project_id) else {
            return Err(CoreError::NotFound(format!("project {project_id}")));
        };
        let Some((kind, pos)) = index[idx].find_transaction(tx_id) else {
            return Err(CoreError::NotFound(format!("transaction {tx_id}")));
        };
        index[idx].transactions_mut(kind)[pos].apply(patch);
        let updated = index[idx].transactions(kind)[pos].clone();
        index[idx].touch();
        let project = index[idx].clone();
        self.write_index(&index)?;
        self.write_progress(&project)?;
        Ok(updated)
    }

    /// Replace a transaction wholesale with a server-issued record (mirror of
    /// a remote update).
    pub fn replace_transaction(&self, project_id: &str, tx: &Transaction) -> Result<(), CoreError> {
        let mut index = self.read_index()?;
        let Some(idx) = index.iter().position(|p| p.id == project_id) else {
            return Err(CoreError::NotFound(format!("project {project_id}")));
        };
        let Some((kind, pos)) = index[idx].find_transaction(&tx.id) else {
            return Err(CoreError::NotFound(format!("transaction {}", tx.id)));
        };
        index[idx].transactions_mut(kind)[pos] = tx.clone();
        index[idx].touch();
        let project = index[idx].clone();
        self.write_index(&index)?;
        self.write_progress(&project)?;
        Ok(())
    }

    /// Remove a transaction (same three-sequence scan) and return the updated
    /// parent project.
    pub fn delete_transaction(&self, project_id: &str, tx_id: &str) -> Result<Project, CoreError> {
        let mut index = self.read_index()?;
        let Some(idx) = index.iter().position(|p| p.id == project_id) else {
            return Err(CoreError::NotFound(format!("project {project_id}")));
        };
        let Some((kind, pos)) = index[idx].find_transaction(tx_id) else {
            return Err(CoreError::NotFound(format!("transaction {tx_id}")));
        };
        index[idx].transactions_mut(kind).remove(pos);
        index[idx].touch();
        let project = index[idx].clone();
        self.write_index(&index)?;
        self.write_progress(&project)?;
        Ok(project)
    }

    // ── Derived data ────────────────────────────────────────────────

    pub fn progress_for(&self, project_id: &str) -> Result<Option<ProgressData>, CoreError> {
        match self.backend.read(&self.progress_key(project_id))? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| CoreError::Deserialization(format!("corrupt progress record: {e}"))),
            None => Ok(None),
        }
    }

    /// Recompute the derived record from the stored project state.
    pub fn refresh_progress(&self, project_id: &str) -> Result<ProgressData, CoreError> {
        let project = self
            .get_project(project_id)?
            .ok_or_else(|| CoreError::NotFound(format!("project {project_id}")))?;
        self.write_progress(&project)
    }

    // ── AI suggestions ──────────────────────────────────────────────

    pub fn suggestions_for(&self, project_id: &str) -> Result<Vec<AiSuggestion>, CoreError> {
        match self.backend.read(&self.suggestions_key(project_id))? {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| CoreError::Deserialization(format!("corrupt suggestion record: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    /// Record a suggestion against an existing project.
    pub fn add_suggestion(
        &self,
        project_id: &str,
        input: &NewSuggestion,
    ) -> Result<AiSuggestion, CoreError> {
        input.validate()?;
        if self.get_project(project_id)?.is_none() {
            return Err(CoreError::NotFound(format!("project {project_id}")));
        }
        let suggestion = AiSuggestion::create(input);
        let mut suggestions = self.suggestions_for(project_id)?;
        suggestions.push(suggestion.clone());
        self.write_suggestions(project_id, &suggestions)?;
        Ok(suggestion)
    }

    /// Mark a suggestion applied, stamping `applied_at`.
    pub fn apply_suggestion(
        &self,
        project_id: &str,
        suggestion_id: &str,
    ) -> Result<AiSuggestion, CoreError> {
        let mut suggestions = self.suggestions_for(project_id)?;
        let Some(suggestion) = suggestions.iter_mut().find(|s| s.id == suggestion_id) else {
            return Err(CoreError::NotFound(format!("suggestion {suggestion_id}")));
        };
        suggestion.mark_applied();
        let applied = suggestion.clone();
        self.write_suggestions(project_id, &suggestions)?;
        Ok(applied)
    }

    fn write_suggestions(
        &self,
        project_id: &str,
        suggestions: &[AiSuggestion],
    ) -> Result<(), CoreError> {
        let json = serde_json::to_string(suggestions)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        self.backend.write(&self.suggestions_key(project_id), &json)
    }

    // ── Reconciliation ──────────────────────────────────────────────

    /// After a remote create confirms an optimistic local commit: swap the
    /// local record for the server-issued one (keeping its index slot) and
    /// re-key the progress and suggestion side records to the new id.
    /// Transactions travel inside the project record, so only the side
    /// tables need moving.
    pub fn adopt_remote_identity(
        &self,
        local_id: &str,
        remote: Project,
    ) -> Result<Project, CoreError> {
        let mut index = self.read_index()?;
        match index.iter().position(|p| p.id == local_id) {
            Some(idx) => index[idx] = remote.clone(),
            // The optimistic record vanished in the meantime; fall back to a
            // plain mirror append.
            None => index.push(remote.clone()),
        }
        self.write_index(&index)?;

        if local_id != remote.id {
            if let Some(suggestions) = self.backend.read(&self.suggestions_key(local_id))? {
                self.backend
                    .write(&self.suggestions_key(&remote.id), &suggestions)?;
                self.backend.remove(&self.suggestions_key(local_id))?;
            }
            self.backend.remove(&self.progress_key(local_id))?;
        }
        self.write_progress(&remote)?;
        Ok(remote)
    }
}
