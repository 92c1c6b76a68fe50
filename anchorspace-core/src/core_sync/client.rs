//! Facade trait for the synchronization network

use super::error::SyncResult;
use crate::core_credential::Permission;
use crate::core_identity::{Aid, SigningKey};
use crate::core_space::{Space, SpaceId, SpaceType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Network peer identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(String);

impl PeerId {
    /// Wrap a peer identity string
    pub fn new(s: impl Into<String>) -> Self {
        PeerId(s.into())
    }

    /// Get the string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One permission grant on a space
///
/// Append-only from this subsystem's perspective: revocation is expressed
/// as a later entry with a reduced or empty permission set. How the network
/// resolves duplicate entries for the same peer is its own policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    /// Peer the grant applies to
    pub peer_id: PeerId,

    /// Ordered capability set
    pub permissions: Vec<Permission>,
}

/// Capability interface wrapping the synchronization network
///
/// One production implementation talks to the real network; the in-memory
/// double shares the same contract for tests. Space identifiers are
/// deterministic given owner identity, space type, and a valid signing key.
#[async_trait]
pub trait SyncClient: Send + Sync {
    /// Create a space for the derived identifier, or return the existing
    /// record when one is already present (idempotent-create contract)
    async fn create_space(
        &self,
        owner_aid: &Aid,
        space_type: SpaceType,
        signing_key: &SigningKey,
    ) -> SyncResult<Space>;

    /// Same contract as `create_space`; used when the caller expects the
    /// space to exist already. Never errors just because it did not.
    async fn derive_space(
        &self,
        owner_aid: &Aid,
        space_type: SpaceType,
        signing_key: &SigningKey,
    ) -> SyncResult<Space>;

    /// Pure identifier derivation with no network side effect
    ///
    /// Stable: identical inputs always yield the identical identifier, and
    /// that identifier equals the `space_id` later returned by
    /// `create_space`/`derive_space` for the same inputs.
    async fn derive_space_id(
        &self,
        owner_aid: &Aid,
        space_type: SpaceType,
        signing_key: &SigningKey,
    ) -> SyncResult<SpaceId>;

    /// Append a permission grant to a space's ACL
    async fn add_to_acl(
        &self,
        space_id: &SpaceId,
        peer_id: &PeerId,
        permissions: &[Permission],
    ) -> SyncResult<()>;

    /// Publish or overwrite a document's byte payload within a space
    async fn sync_document(&self, space_id: &SpaceId, doc_id: &str, data: &[u8]) -> SyncResult<()>;

    /// Identifier of the network this client is attached to
    fn network_id(&self) -> &str;

    /// Coordinator endpoint this client connects through
    fn coordinator_url(&self) -> &str;

    /// This client's own peer identity
    fn peer_id(&self) -> &PeerId;

    /// Release underlying network resources
    ///
    /// Idempotent: a second call returns the closer's error state without
    /// panicking. After close, every other operation fails with `Closed`.
    async fn close(&self) -> SyncResult<()>;
}
