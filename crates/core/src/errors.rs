use thiserror::Error;

/// Unified error type for the entire ledgersync-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Remote / Network ────────────────────────────────────────────
    #[error("Authentication required — sign in again")]
    AuthRequired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    // ── Local Storage ───────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl CoreError {
    /// True for remote failures the orchestrator absorbs by degrading to the
    /// local store: the backend is unreachable or unable to serve the call.
    #[must_use]
    pub fn is_connectivity_failure(&self) -> bool {
        matches!(
            self,
            CoreError::Network(_) | CoreError::Timeout(_) | CoreError::Server { .. }
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs so tokens
        // never end up in the error chain. reqwest errors often contain full URLs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        if e.is_timeout() {
            CoreError::Timeout(sanitized)
        } else {
            CoreError::Network(sanitized)
        }
    }
}
