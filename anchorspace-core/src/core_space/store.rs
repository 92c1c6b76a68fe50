//! Space store capability interface

use super::space::Space;
use super::types::SpaceType;
use crate::core_identity::Aid;
use thiserror::Error;

/// Errors that can occur in the space store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the requested owner
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable mapping from owner identity to its space records
///
/// The one-record-per-type invariant is enforced here, through the upsert
/// key, not by the network. An identity's personal and community records
/// never collide.
pub trait SpaceStore: Send + Sync {
    /// Look up the space of the given type owned by an identity
    fn get_user_space(&self, owner_aid: &Aid, space_type: SpaceType) -> StoreResult<Space>;

    /// Upsert a record keyed by `(space.owner_aid, space.space_type)`
    fn save_space(&self, space: &Space) -> StoreResult<()>;

    /// Full enumeration, order unspecified; for administrative
    /// reconciliation, not hot-path logic
    fn list_all_spaces(&self) -> StoreResult<Vec<Space>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NotFound("EUser1".to_string());
        assert_eq!(err.to_string(), "Not found: EUser1");
    }
}
