pub mod connectivity;
pub mod insight_service;
pub mod sync_service;
