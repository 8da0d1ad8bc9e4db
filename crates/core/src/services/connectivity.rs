use std::sync::atomic::{AtomicBool, Ordering};

/// Backend reachability state, owned by one orchestrator instance so
/// multiple instances (and tests) stay isolated.
///
/// `backend_available` is set optimistically by the startup probe, flipped to
/// `false` by any operation hitting a connectivity failure, and flipped back
/// to `true` only by the next explicit probe. `auth_revoked` latches after an
/// auth failure until fresh credentials are installed.
#[derive(Debug)]
pub struct ConnectivityState {
    backend_available: AtomicBool,
    auth_revoked: AtomicBool,
}

impl ConnectivityState {
    #[must_use]
    pub fn new(initially_available: bool) -> Self {
        Self {
            backend_available: AtomicBool::new(initially_available),
            auth_revoked: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.backend_available.load(Ordering::Relaxed)
    }

    pub fn mark_available(&self) {
        self.backend_available.store(true, Ordering::Relaxed);
    }

    pub fn mark_unavailable(&self) {
        self.backend_available.store(false, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_auth_revoked(&self) -> bool {
        self.auth_revoked.load(Ordering::Relaxed)
    }

    pub fn revoke_auth(&self) {
        self.auth_revoked.store(true, Ordering::Relaxed);
    }

    pub fn restore_auth(&self) {
        self.auth_revoked.store(false, Ordering::Relaxed);
    }
}
