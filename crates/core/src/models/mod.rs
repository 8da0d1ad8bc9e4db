pub mod ids;
pub mod insights;
pub mod progress;
pub mod project;
pub mod suggestion;
pub mod transaction;
