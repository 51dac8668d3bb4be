pub mod accounts;
pub mod error;
pub mod friends;
pub mod memory;
pub mod messages;
pub mod sqlite;
pub mod store;
pub mod tasks;

pub use error::ServiceError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{DynStore, Store};

/// Returns the trimmed value, or a validation error naming the field when it
/// is absent or blank.
pub(crate) fn required_text(value: Option<String>, field: &str) -> Result<String, ServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ServiceError::BadRequest(format!("{} is required", field))),
    }
}

pub(crate) fn required<T>(value: Option<T>, field: &str) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::BadRequest(format!("{} is required", field)))
}

/// Blank optional strings are stored as absent.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
