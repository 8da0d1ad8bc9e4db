// ═══════════════════════════════════════════════════════════════════
// Remote Tests — route table, session store, client configuration
// ═══════════════════════════════════════════════════════════════════

use std::time::Duration;

use ledgersync_core::remote::api::DeleteReceipt;
use ledgersync_core::remote::http::{RemoteConfig, TENANT_HEADER};
use ledgersync_core::remote::routes::Routes;
use ledgersync_core::remote::session::{Credentials, SessionStore};

// ═══════════════════════════════════════════════════════════════════
//  Routes
// ═══════════════════════════════════════════════════════════════════

mod routes {
    use super::*;

    #[test]
    fn builds_every_operation_path() {
        let routes = Routes::new("https://ledger.example.com/api");
        assert_eq!(routes.health(), "https://ledger.example.com/api/health");
        assert_eq!(routes.projects(), "https://ledger.example.com/api/projects");
        assert_eq!(
            routes.project("p1"),
            "https://ledger.example.com/api/projects/p1"
        );
        assert_eq!(
            routes.transactions("p1"),
            "https://ledger.example.com/api/projects/p1/transactions"
        );
        assert_eq!(
            routes.transaction("p1", "tx1"),
            "https://ledger.example.com/api/projects/p1/transactions/tx1"
        );
    }

    #[test]
    fn tolerates_trailing_slashes() {
        let routes = Routes::new("https://ledger.example.com/api//");
        assert_eq!(routes.health(), "https://ledger.example.com/api/health");
    }

    #[test]
    fn local_ids_embed_cleanly() {
        let routes = Routes::new("/api");
        assert_eq!(
            routes.project("local_1700000000000_ab12cd34"),
            "/api/projects/local_1700000000000_ab12cd34"
        );
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Session store
// ═══════════════════════════════════════════════════════════════════

mod session {
    use super::*;

    #[test]
    fn stores_and_returns_credentials() {
        let store = SessionStore::new(Credentials::new("token-1", "tenant-a"));
        let creds = store.current().unwrap();
        assert_eq!(creds.token, "token-1");
        assert_eq!(creds.tenant_id, "tenant-a");
    }

    #[test]
    fn signed_out_has_no_credentials() {
        assert!(SessionStore::signed_out().current().is_none());
    }

    #[test]
    fn clear_forgets_credentials() {
        let store = SessionStore::new(Credentials::new("token-1", "tenant-a"));
        store.clear();
        assert!(store.current().is_none());
    }

    #[test]
    fn set_replaces_credentials() {
        let store = SessionStore::new(Credentials::new("token-1", "tenant-a"));
        store.set(Credentials::new("token-2", "tenant-a"));
        assert_eq!(store.current().unwrap().token, "token-2");
    }

    #[test]
    fn incomplete_credentials_are_unusable() {
        assert!(!Credentials::new("", "tenant-a").is_complete());
        assert!(!Credentials::new("token-1", " ").is_complete());
        assert!(Credentials::new("token-1", "tenant-a").is_complete());

        // A store holding incomplete credentials reports none at all.
        let store = SessionStore::new(Credentials::new("", "tenant-a"));
        assert!(store.current().is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Configuration & wire shapes
// ═══════════════════════════════════════════════════════════════════

mod config {
    use super::*;

    #[test]
    fn defaults_match_the_documented_policy() {
        let config = RemoteConfig::default();
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.read_retries, 2);
        assert_eq!(config.retry_base_delay, Duration::from_secs(1));
        assert!(config.base_url.ends_with("/api"));
    }

    #[test]
    fn tenant_header_name() {
        assert_eq!(TENANT_HEADER, "X-Tenant-ID");
    }

    #[test]
    fn delete_receipt_uses_camel_case() {
        let receipt: DeleteReceipt =
            serde_json::from_str(r#"{"success":true,"deletedId":"p1"}"#).unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.deleted_id, Some("p1".to_string()));
    }

    #[test]
    fn delete_receipt_tolerates_missing_id() {
        let receipt: DeleteReceipt = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(receipt.deleted_id, None);
    }
}
