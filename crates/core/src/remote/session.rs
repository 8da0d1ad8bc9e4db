use std::sync::RwLock;

/// Bearer token + tenant pair identifying the authenticated session.
/// Every outbound request carries both; without them no call is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub tenant_id: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            tenant_id: tenant_id.into(),
        }
    }

    /// Credentials with an empty token or tenant are unusable.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.token.trim().is_empty() && !self.tenant_id.trim().is_empty()
    }
}

/// Shared holder for the active credentials. Cleared on session teardown
/// (auth failure), replaced on sign-in.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<Option<Credentials>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            inner: RwLock::new(Some(credentials)),
        }
    }

    /// A store with no credentials (signed out).
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn set(&self, credentials: Credentials) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Some(credentials);
    }

    /// Session teardown: forget the stored credentials.
    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// The current credentials, if complete ones are stored.
    #[must_use]
    pub fn current(&self) -> Option<Credentials> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .filter(Credentials::is_complete)
    }
}
