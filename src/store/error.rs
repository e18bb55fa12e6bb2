//! Error types for store operations.

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for store operations.
///
/// Persistence failures are deliberately absent from most operations: the
/// snapshot write-through is best-effort and only ever surfaces as a warning,
/// never as a caller-visible error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Requested entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Publish was requested while no draft timetable exists.
    #[error("no draft timetable to publish")]
    NoDraft,

    /// Snapshot could not be loaded at startup.
    #[error("failed to load snapshot: {0}")]
    SnapshotLoad(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
