use chrono::Utc;
use uuid::Uuid;

/// Locally-minted identifiers follow the `<prefix>_<millis>_<random8>` shape
/// the backend also understands, so records created offline can be told apart
/// from server-issued ones by prefix alone.
fn mint(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), &suffix[..8])
}

/// Mint an id for a project created while the backend is unreachable.
#[must_use]
pub fn local_project_id() -> String {
    mint("local")
}

/// Mint an id for a new transaction.
#[must_use]
pub fn transaction_id() -> String {
    mint("tx")
}

/// Mint an id for a new AI suggestion record.
#[must_use]
pub fn suggestion_id() -> String {
    mint("ai")
}

/// True when a project id was minted locally (never confirmed by the backend).
#[must_use]
pub fn is_locally_minted(id: &str) -> bool {
    id.starts_with("local_")
}
