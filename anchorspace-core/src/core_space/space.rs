//! Space data structure

use super::types::{SpaceId, SpaceType, Timestamp};
use crate::core_identity::Aid;
use serde::{Deserialize, Serialize};

/// One collaborative synchronization namespace bound to an identity
///
/// At most one record exists per `(owner_aid, space_type)` pair, both
/// locally and on the network. Records are created on first successful
/// derivation and never deleted by this subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    /// Network-derived unique identifier
    pub space_id: SpaceId,

    /// Owning identity; immutable once created
    pub owner_aid: Aid,

    /// Kind of space; immutable
    pub space_type: SpaceType,

    /// Set once at first successful creation
    pub created_at: Timestamp,
}

impl Space {
    /// Build a record for a space that just materialized on the network
    pub fn new(space_id: SpaceId, owner_aid: Aid, space_type: SpaceType) -> Self {
        Space {
            space_id,
            owner_aid,
            space_type,
            created_at: Timestamp::now(),
        }
    }
}
