// ═══════════════════════════════════════════════════════════════════
// Store Tests — LocalStore upserts, transactions, derived records,
// suggestion side table, tenant isolation, file backend
// ═══════════════════════════════════════════════════════════════════

use std::sync::Arc;

use ledgersync_core::errors::CoreError;
use ledgersync_core::models::ids;
use ledgersync_core::models::project::{NewProject, Project, ProjectUpdate};
use ledgersync_core::models::suggestion::{NewSuggestion, Priority};
use ledgersync_core::models::transaction::{NewTransaction, TransactionKind, TransactionUpdate};
use ledgersync_core::storage::backend::{FileBackend, MemoryBackend};
use ledgersync_core::storage::store::LocalStore;

const EPS: f64 = 1e-9;

fn store() -> LocalStore {
    LocalStore::new(Box::new(MemoryBackend::new()), "tenant-a")
}

fn roof() -> NewProject {
    NewProject {
        name: "Roof".into(),
        budget: Some(50_000.0),
        ..Default::default()
    }
}

fn tx(description: &str, amount: f64) -> NewTransaction {
    NewTransaction {
        description: description.into(),
        amount,
        date: None,
        category: None,
    }
}

fn suggestion() -> NewSuggestion {
    NewSuggestion {
        title: "Trim materials budget".into(),
        description: String::new(),
        priority: Priority::Medium,
        kind: "budget".into(),
        action: "Reduce materials by 10%".into(),
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Projects
// ═══════════════════════════════════════════════════════════════════

mod projects {
    use super::*;

    #[test]
    fn create_assigns_local_id_and_zeroed_progress() {
        let store = store();
        let p = store.create_project(&roof()).unwrap();
        assert!(ids::is_locally_minted(&p.id));
        assert_eq!(p.currency, "INR");
        assert!(p.income.is_empty());

        let progress = store.progress_for(&p.id).unwrap().unwrap();
        assert!(progress.financial_progress.spent.abs() < EPS);
    }

    #[test]
    fn create_rejects_invalid_input_before_io() {
        let store = store();
        let err = store
            .create_project(&NewProject {
                name: "".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(store.list_projects().unwrap().is_empty());
    }

    #[test]
    fn list_preserves_insertion_order() {
        let store = store();
        let a = store.create_project(&roof()).unwrap();
        let b = store
            .create_project(&NewProject {
                name: "Kitchen".into(),
                ..Default::default()
            })
            .unwrap();
        let listed = store.list_projects().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, a.id);
        assert_eq!(listed[1].id, b.id);
    }

    #[test]
    fn save_is_idempotent_per_id() {
        let store = store();
        let p = store.create_project(&roof()).unwrap();

        let first = store.save_project(p.clone()).unwrap();
        let second = store.save_project(first.clone()).unwrap();

        let listed = store.list_projects().unwrap();
        assert_eq!(listed.len(), 1);
        // updated_at comes from the second call
        assert!(second.updated_at > first.updated_at);
        assert_eq!(listed[0].updated_at, second.updated_at);
    }

    #[test]
    fn save_mints_id_when_absent() {
        let store = store();
        let mut p = Project::create(&roof());
        p.id = String::new();
        let saved = store.save_project(p).unwrap();
        assert!(ids::is_locally_minted(&saved.id));
    }

    #[test]
    fn save_fills_empty_currency() {
        let store = store();
        let mut p = Project::create(&roof());
        p.currency = String::new();
        let saved = store.save_project(p).unwrap();
        assert_eq!(saved.currency, "INR");
    }

    #[test]
    fn save_does_not_clobber_existing_progress() {
        let store = store();
        let p = store.create_project(&roof()).unwrap();
        store
            .add_transaction(&p.id, &tx("Advance", 100.0), TransactionKind::Income)
            .unwrap();

        let refreshed = store.get_project(&p.id).unwrap().unwrap();
        store.save_project(refreshed).unwrap();

        let progress = store.progress_for(&p.id).unwrap().unwrap();
        assert!((progress.financial_progress.remaining - 100.0).abs() < EPS);
    }

    #[test]
    fn update_patches_and_recomputes() {
        let store = store();
        let p = store.create_project(&roof()).unwrap();
        store
            .add_transaction(&p.id, &tx("Tiles", 10_000.0), TransactionKind::Expense)
            .unwrap();

        let updated = store
            .apply_update(
                &p.id,
                &ProjectUpdate {
                    budget: Some(20_000.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.budget, Some(20_000.0));

        let progress = store.progress_for(&p.id).unwrap().unwrap();
        assert!((progress.financial_progress.percentage - 50.0).abs() < EPS);
    }

    #[test]
    fn update_unknown_project_is_not_found() {
        let store = store();
        let err = store
            .apply_update("missing", &ProjectUpdate::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn delete_removes_project_and_side_records() {
        let store = store();
        let p = store.create_project(&roof()).unwrap();
        store.add_suggestion(&p.id, &suggestion()).unwrap();

        let deleted = store.delete_project(&p.id).unwrap();
        assert_eq!(deleted, Some(p.id.clone()));
        assert!(store.get_project(&p.id).unwrap().is_none());
        assert!(store.progress_for(&p.id).unwrap().is_none());
        assert!(store.suggestions_for(&p.id).unwrap().is_empty());
    }

    #[test]
    fn delete_unknown_project_is_a_no_op() {
        let store = store();
        assert_eq!(store.delete_project("missing").unwrap(), None);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Transactions
// ═══════════════════════════════════════════════════════════════════

mod transactions {
    use super::*;

    #[test]
    fn add_appends_and_recomputes_reference_vector() {
        // income=[100,200], expenses=[50], tax=[10], budget=200
        let store = store();
        let p = store
            .create_project(&NewProject {
                name: "Roof".into(),
                budget: Some(200.0),
                ..Default::default()
            })
            .unwrap();

        store
            .add_transaction(&p.id, &tx("in1", 100.0), TransactionKind::Income)
            .unwrap();
        store
            .add_transaction(&p.id, &tx("in2", 200.0), TransactionKind::Income)
            .unwrap();
        store
            .add_transaction(&p.id, &tx("out", 50.0), TransactionKind::Expense)
            .unwrap();
        store
            .add_transaction(&p.id, &tx("gst", 10.0), TransactionKind::Tax)
            .unwrap();

        let stored = store.get_project(&p.id).unwrap().unwrap();
        assert_eq!(stored.income.len(), 2);
        assert_eq!(stored.expenses.len(), 1);
        assert_eq!(stored.tax.len(), 1);

        let progress = store.progress_for(&p.id).unwrap().unwrap();
        assert!((progress.financial_progress.spent - 50.0).abs() < EPS);
        assert!((progress.financial_progress.remaining - 240.0).abs() < EPS);
        assert!((progress.financial_progress.percentage - 25.0).abs() < EPS);
    }

    #[test]
    fn add_to_unknown_project_is_not_found() {
        let store = store();
        let err = store
            .add_transaction("missing", &tx("in", 10.0), TransactionKind::Income)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn add_bumps_updated_at() {
        let store = store();
        let p = store.create_project(&roof()).unwrap();
        store
            .add_transaction(&p.id, &tx("in", 10.0), TransactionKind::Income)
            .unwrap();
        let stored = store.get_project(&p.id).unwrap().unwrap();
        assert!(stored.updated_at > p.updated_at);
    }

    #[test]
    fn update_finds_transaction_in_any_sequence() {
        let store = store();
        let p = store.create_project(&roof()).unwrap();
        let in_tx = store
            .add_transaction(&p.id, &tx("in", 10.0), TransactionKind::Income)
            .unwrap();
        let out_tx = store
            .add_transaction(&p.id, &tx("out", 20.0), TransactionKind::Expense)
            .unwrap();
        let tax_tx = store
            .add_transaction(&p.id, &tx("gst", 5.0), TransactionKind::Tax)
            .unwrap();

        for tx_id in [&in_tx.id, &out_tx.id, &tax_tx.id] {
            let updated = store
                .update_transaction(
                    &p.id,
                    tx_id,
                    &TransactionUpdate {
                        category: Some("revised".into()),
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(updated.category, "revised");
        }
    }

    #[test]
    fn update_recomputes_progress() {
        let store = store();
        let p = store.create_project(&roof()).unwrap();
        let out_tx = store
            .add_transaction(&p.id, &tx("out", 20.0), TransactionKind::Expense)
            .unwrap();

        store
            .update_transaction(
                &p.id,
                &out_tx.id,
                &TransactionUpdate {
                    amount: Some(500.0),
                    ..Default::default()
                },
            )
            .unwrap();

        let progress = store.progress_for(&p.id).unwrap().unwrap();
        assert!((progress.financial_progress.spent - 500.0).abs() < EPS);
    }

    #[test]
    fn update_missing_everywhere_is_not_found() {
        let store = store();
        let p = store.create_project(&roof()).unwrap();
        store
            .add_transaction(&p.id, &tx("in", 10.0), TransactionKind::Income)
            .unwrap();

        let err = store
            .update_transaction(&p.id, "tx_missing", &TransactionUpdate::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn delete_from_any_sequence_returns_updated_parent() {
        let store = store();
        let p = store.create_project(&roof()).unwrap();
        store
            .add_transaction(&p.id, &tx("in", 10.0), TransactionKind::Income)
            .unwrap();
        let tax_tx = store
            .add_transaction(&p.id, &tx("gst", 5.0), TransactionKind::Tax)
            .unwrap();

        let parent = store.delete_transaction(&p.id, &tax_tx.id).unwrap();
        assert!(parent.tax.is_empty());
        assert_eq!(parent.income.len(), 1);

        let err = store.delete_transaction(&p.id, &tax_tx.id).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn validation_failures_leave_store_untouched() {
        let store = store();
        let p = store.create_project(&roof()).unwrap();
        let err = store
            .add_transaction(&p.id, &tx("bad", -1.0), TransactionKind::Income)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(store.get_project(&p.id).unwrap().unwrap().income.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Suggestion side table
// ═══════════════════════════════════════════════════════════════════

mod suggestions {
    use super::*;

    #[test]
    fn add_requires_existing_project() {
        let store = store();
        let err = store.add_suggestion("missing", &suggestion()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn add_and_apply() {
        let store = store();
        let p = store.create_project(&roof()).unwrap();
        let s = store.add_suggestion(&p.id, &suggestion()).unwrap();
        assert!(s.id.starts_with("ai_"));
        assert!(!s.is_applied);

        let applied = store.apply_suggestion(&p.id, &s.id).unwrap();
        assert!(applied.is_applied);
        assert!(applied.applied_at.is_some());

        let stored = store.suggestions_for(&p.id).unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].is_applied);
    }

    #[test]
    fn apply_unknown_suggestion_is_not_found() {
        let store = store();
        let p = store.create_project(&roof()).unwrap();
        let err = store.apply_suggestion(&p.id, "ai_missing").unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Reconciliation
// ═══════════════════════════════════════════════════════════════════

mod reconciliation {
    use super::*;

    #[test]
    fn adopt_remote_identity_rekeys_side_records() {
        let store = store();
        let local = store.create_project(&roof()).unwrap();
        store.add_suggestion(&local.id, &suggestion()).unwrap();

        let mut remote = Project::create(&roof());
        remote.id = "srv_1".to_string();

        let adopted = store.adopt_remote_identity(&local.id, remote).unwrap();
        assert_eq!(adopted.id, "srv_1");

        // single record, in the original slot, under the server id
        let listed = store.list_projects().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "srv_1");

        // side records moved to the new id
        assert!(store.progress_for(&local.id).unwrap().is_none());
        assert!(store.progress_for("srv_1").unwrap().is_some());
        assert!(store.suggestions_for(&local.id).unwrap().is_empty());
        assert_eq!(store.suggestions_for("srv_1").unwrap().len(), 1);
    }

    #[test]
    fn adopt_appends_when_local_record_vanished() {
        let store = store();
        let mut remote = Project::create(&roof());
        remote.id = "srv_2".to_string();

        store
            .adopt_remote_identity("local_gone", remote)
            .unwrap();
        assert_eq!(store.list_projects().unwrap().len(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Tenant isolation
// ═══════════════════════════════════════════════════════════════════

mod tenancy {
    use super::*;

    #[test]
    fn tenants_do_not_see_each_other() {
        let backend = Arc::new(MemoryBackend::new());
        let store_a = LocalStore::new(Box::new(Arc::clone(&backend)), "tenant-a");
        let store_b = LocalStore::new(Box::new(Arc::clone(&backend)), "tenant-b");

        let p = store_a.create_project(&roof()).unwrap();

        assert!(store_b.list_projects().unwrap().is_empty());
        assert!(store_b.get_project(&p.id).unwrap().is_none());
        assert!(store_b.progress_for(&p.id).unwrap().is_none());
    }

    #[test]
    fn delete_in_one_tenant_leaves_the_other() {
        let backend = Arc::new(MemoryBackend::new());
        let store_a = LocalStore::new(Box::new(Arc::clone(&backend)), "tenant-a");
        let store_b = LocalStore::new(Box::new(Arc::clone(&backend)), "tenant-b");

        let pa = store_a.create_project(&roof()).unwrap();
        store_b.create_project(&roof()).unwrap();

        store_a.delete_project(&pa.id).unwrap();
        assert_eq!(store_b.list_projects().unwrap().len(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  File backend
// ═══════════════════════════════════════════════════════════════════

mod file_backend {
    use super::*;

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap().to_string();

        let created = {
            let backend = FileBackend::new(&path).unwrap();
            let store = LocalStore::new(Box::new(backend), "tenant-a");
            let p = store.create_project(&roof()).unwrap();
            store
                .add_transaction(&p.id, &tx("Advance", 20_000.0), TransactionKind::Income)
                .unwrap();
            p
        };

        let backend = FileBackend::new(&path).unwrap();
        let store = LocalStore::new(Box::new(backend), "tenant-a");
        let reloaded = store.get_project(&created.id).unwrap().unwrap();
        assert_eq!(reloaded.income.len(), 1);

        let progress = store.progress_for(&created.id).unwrap().unwrap();
        assert!((progress.financial_progress.remaining - 20_000.0).abs() < EPS);
    }

    #[test]
    fn delete_removes_backing_files() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path()).unwrap();
        let store = LocalStore::new(Box::new(backend), "tenant-a");

        let p = store.create_project(&roof()).unwrap();
        store.delete_project(&p.id).unwrap();
        assert!(store.progress_for(&p.id).unwrap().is_none());
    }
}
