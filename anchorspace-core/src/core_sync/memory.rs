//! In-memory synchronization client
//!
//! Test double sharing the facade contract. Derivation is deterministic
//! from `(space_type, owner_aid, network_id)`, creation is idempotent, and
//! ACLs are recorded append-only so tests can observe grant ordering.
//! Duplicate materialization of an already-present object is dropped
//! silently rather than surfaced as an error.

use super::client::{AclEntry, PeerId, SyncClient};
use super::error::{SyncError, SyncResult};
use crate::core_credential::Permission;
use crate::core_identity::{Aid, SigningKey};
use crate::core_space::{Space, SpaceId, SpaceType};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Helper to convert poison errors into SyncError
fn handle_poison<T>(_err: PoisonError<T>) -> SyncError {
    SyncError::Connection("lock poisoned: a thread panicked while holding the lock".to_string())
}

#[derive(Default)]
struct MemoryState {
    spaces: HashMap<SpaceId, Space>,
    acls: HashMap<SpaceId, Vec<AclEntry>>,
    documents: HashMap<(SpaceId, String), Vec<u8>>,
    closed: bool,
    offline: bool,
    derive_calls: usize,
    create_calls: usize,
    acl_calls: usize,
}

/// In-memory facade implementation
pub struct MemorySyncClient {
    network_id: String,
    coordinator_url: String,
    peer_id: PeerId,
    state: Mutex<MemoryState>,
}

impl MemorySyncClient {
    /// Create a double with default network identity
    pub fn new() -> Self {
        Self::with_identity(
            "1",
            "https://coordinator.localhost:8443",
            PeerId::new("peer-mem-1"),
        )
    }

    /// Create a double with explicit network identity
    pub fn with_identity(
        network_id: impl Into<String>,
        coordinator_url: impl Into<String>,
        peer_id: PeerId,
    ) -> Self {
        Self {
            network_id: network_id.into(),
            coordinator_url: coordinator_url.into(),
            peer_id,
            state: Mutex::new(MemoryState::default()),
        }
    }

    fn derive_id(&self, owner_aid: &Aid, space_type: SpaceType) -> SpaceId {
        SpaceId::new(format!(
            "space_{}_{}_{}",
            space_type.as_str(),
            owner_aid.as_str(),
            self.network_id
        ))
    }

    fn check_available(state: &MemoryState) -> SyncResult<()> {
        if state.closed {
            return Err(SyncError::Closed);
        }
        if state.offline {
            return Err(SyncError::Connection("network unreachable".to_string()));
        }
        Ok(())
    }

    fn check_auth(owner_aid: &Aid, signing_key: &SigningKey) -> SyncResult<()> {
        if !signing_key.authenticates(owner_aid) {
            return Err(SyncError::Auth(format!(
                "signing key for {} cannot act as {}",
                signing_key.aid(),
                owner_aid
            )));
        }
        Ok(())
    }

    fn materialize(
        &self,
        owner_aid: &Aid,
        space_type: SpaceType,
        signing_key: &SigningKey,
    ) -> SyncResult<Space> {
        Self::check_auth(owner_aid, signing_key)?;

        let space_id = self.derive_id(owner_aid, space_type);
        let mut state = self.state.lock().map_err(handle_poison)?;
        Self::check_available(&state)?;

        // Already-present objects are returned as-is; the duplicate-create
        // race is benign and never an error.
        if let Some(existing) = state.spaces.get(&space_id) {
            return Ok(existing.clone());
        }

        let space = Space::new(space_id.clone(), owner_aid.clone(), space_type);
        state.spaces.insert(space_id.clone(), space.clone());
        state.acls.entry(space_id).or_default();
        Ok(space)
    }

    /// Simulate network reachability for fault-injection tests
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.offline = offline;
        }
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.state.lock().map(|s| s.closed).unwrap_or(true)
    }

    /// Number of `derive_space` calls observed
    pub fn derive_calls(&self) -> usize {
        self.state.lock().map(|s| s.derive_calls).unwrap_or(0)
    }

    /// Number of `create_space` calls observed
    pub fn create_calls(&self) -> usize {
        self.state.lock().map(|s| s.create_calls).unwrap_or(0)
    }

    /// Number of `add_to_acl` calls observed
    pub fn acl_calls(&self) -> usize {
        self.state.lock().map(|s| s.acl_calls).unwrap_or(0)
    }

    /// ACL entries recorded for a space, in append order
    pub fn acl_entries(&self, space_id: &SpaceId) -> Vec<AclEntry> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.acls.get(space_id).cloned())
            .unwrap_or_default()
    }

    /// Last published payload for a document, if any
    pub fn document(&self, space_id: &SpaceId, doc_id: &str) -> Option<Vec<u8>> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.documents.get(&(space_id.clone(), doc_id.to_string())).cloned())
    }
}

impl Default for MemorySyncClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SyncClient for MemorySyncClient {
    async fn create_space(
        &self,
        owner_aid: &Aid,
        space_type: SpaceType,
        signing_key: &SigningKey,
    ) -> SyncResult<Space> {
        {
            let mut state = self.state.lock().map_err(handle_poison)?;
            state.create_calls += 1;
        }
        self.materialize(owner_aid, space_type, signing_key)
    }

    async fn derive_space(
        &self,
        owner_aid: &Aid,
        space_type: SpaceType,
        signing_key: &SigningKey,
    ) -> SyncResult<Space> {
        {
            let mut state = self.state.lock().map_err(handle_poison)?;
            state.derive_calls += 1;
        }
        self.materialize(owner_aid, space_type, signing_key)
    }

    async fn derive_space_id(
        &self,
        owner_aid: &Aid,
        space_type: SpaceType,
        signing_key: &SigningKey,
    ) -> SyncResult<SpaceId> {
        Self::check_auth(owner_aid, signing_key)?;
        let state = self.state.lock().map_err(handle_poison)?;
        if state.closed {
            return Err(SyncError::Closed);
        }
        // Pure derivation: no reachability requirement, no side effect.
        Ok(self.derive_id(owner_aid, space_type))
    }

    async fn add_to_acl(
        &self,
        space_id: &SpaceId,
        peer_id: &PeerId,
        permissions: &[Permission],
    ) -> SyncResult<()> {
        let mut state = self.state.lock().map_err(handle_poison)?;
        Self::check_available(&state)?;

        if !state.spaces.contains_key(space_id) {
            return Err(SyncError::NotFound(space_id.to_string()));
        }

        state.acl_calls += 1;
        state.acls.entry(space_id.clone()).or_default().push(AclEntry {
            peer_id: peer_id.clone(),
            permissions: permissions.to_vec(),
        });
        Ok(())
    }

    async fn sync_document(&self, space_id: &SpaceId, doc_id: &str, data: &[u8]) -> SyncResult<()> {
        let mut state = self.state.lock().map_err(handle_poison)?;
        Self::check_available(&state)?;

        if !state.spaces.contains_key(space_id) {
            return Err(SyncError::NotFound(space_id.to_string()));
        }

        state
            .documents
            .insert((space_id.clone(), doc_id.to_string()), data.to_vec());
        Ok(())
    }

    fn network_id(&self) -> &str {
        &self.network_id
    }

    fn coordinator_url(&self) -> &str {
        &self.coordinator_url
    }

    fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    async fn close(&self) -> SyncResult<()> {
        let mut state = self.state.lock().map_err(handle_poison)?;
        state.closed = true;
        Ok(())
    }
}
