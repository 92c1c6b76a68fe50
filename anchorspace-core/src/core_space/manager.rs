//! Space access manager
//!
//! Orchestrates the facade, the store, and the credential grant table:
//! derives/creates each identity's space exactly once, applies
//! credential-gated ACL grants, and serves the organization-wide community
//! space when configured.

use super::space::Space;
use super::store::{SpaceStore, StoreError};
use super::types::{SpaceId, SpaceType};
use crate::config::{Config, ConfigError};
use crate::core_credential::{Credential, SchemaGrants, SchemaId};
use crate::core_identity::{Aid, SigningKey};
use crate::core_sync::{PeerId, SyncClient, SyncConnection, SyncError, SyncGeneration};
use metrics::counter;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Space manager operation errors
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// Credential schema has no configured permission mapping
    #[error("No permission mapping for credential schema {0}")]
    UnknownSchema(SchemaId),

    /// Recipient has no space yet; grants never provision implicitly
    #[error("No space exists for {0}; ensure the space before granting")]
    SpaceNotFound(Aid),

    /// Community space requested but unset
    #[error("Community space is not configured")]
    NotConfigured,

    /// Facade error, kind preserved
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Store error, kind preserved
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Immutable manager configuration, injected at construction
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Fixed identifier of the shared community space, if any
    pub community_space_id: Option<SpaceId>,

    /// Organization owner identity; required when a community space is set
    pub org_aid: Option<Aid>,

    /// Static credential schema to permission table
    pub schema_grants: SchemaGrants,
}

impl ManagerConfig {
    /// Build from the application configuration
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        if config.community.space_id.is_some() && config.community.org_aid.is_none() {
            return Err(ConfigError::ValidationFailed(
                "community space id set without an organization identity".to_string(),
            ));
        }

        let schema_grants = SchemaGrants::from_config(&config.grants)
            .map_err(ConfigError::InvalidValue)?;

        Ok(Self {
            community_space_id: config.community.space_id.as_deref().map(SpaceId::new),
            org_aid: config.community.org_aid.as_deref().map(Aid::new),
            schema_grants,
        })
    }
}

type LockKey = (Aid, SpaceType);

/// The orchestrator binding identities to spaces
pub struct SpaceAccessManager {
    connection: Arc<SyncConnection>,
    store: Arc<dyn SpaceStore>,
    config: ManagerConfig,

    /// Per-(owner, type) serialization points for the check-then-create
    /// sequences; entries are pruned once no caller holds them
    ensure_locks: Mutex<HashMap<LockKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl SpaceAccessManager {
    /// Create a manager over a connection, a store, and its configuration
    pub fn new(
        connection: Arc<SyncConnection>,
        store: Arc<dyn SpaceStore>,
        config: ManagerConfig,
    ) -> Self {
        Self {
            connection,
            store,
            config,
            ensure_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The shared connection handle, for dependents that must re-resolve
    /// the facade after reinitialization
    pub fn connection(&self) -> Arc<SyncConnection> {
        Arc::clone(&self.connection)
    }

    /// Current facade client with its generation token
    pub async fn client(&self) -> (Arc<dyn SyncClient>, SyncGeneration) {
        self.connection.current().await
    }

    /// Replace the facade client (network reinitialization)
    ///
    /// The superseded client is closed as part of the swap; dependents
    /// observe the bumped generation on their next resolution.
    pub async fn reinitialize(
        &self,
        new_client: Arc<dyn SyncClient>,
    ) -> Result<SyncGeneration, ManagerError> {
        let generation = self.connection.replace(new_client).await?;
        counter!("space_manager.reinitializations").increment(1);
        Ok(generation)
    }

    fn ensure_lock(&self, key: &LockKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .ensure_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    fn release_lock(&self, key: &LockKey, lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .ensure_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Two holders means the map entry plus this caller: nobody waits,
        // so the entry can go.
        if Arc::strong_count(lock) == 2 {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    fn lock_entries(&self) -> usize {
        self.ensure_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn lookup(&self, owner_aid: &Aid, space_type: SpaceType) -> Result<Option<Space>, ManagerError> {
        match self.store.get_user_space(owner_aid, space_type) {
            Ok(space) => Ok(Some(space)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Return the identity's space, deriving and persisting it on first use
    ///
    /// Fast path is a store hit with no lock and no network call. On miss,
    /// calls for the same `(owner_aid, space_type)` serialize on a per-key
    /// mutex and re-check the store before touching the network, so
    /// concurrent first-time requests produce exactly one record. Nothing
    /// is persisted unless derivation succeeded.
    pub async fn ensure_user_space(
        &self,
        owner_aid: &Aid,
        space_type: SpaceType,
        signing_key: &SigningKey,
    ) -> Result<Space, ManagerError> {
        if let Some(space) = self.lookup(owner_aid, space_type)? {
            counter!("space_manager.ensure.hits").increment(1);
            return Ok(space);
        }

        let key = (owner_aid.clone(), space_type);
        let lock = self.ensure_lock(&key);
        let result = self
            .derive_and_persist(&lock, owner_aid, space_type, signing_key)
            .await;
        self.release_lock(&key, &lock);
        result
    }

    async fn derive_and_persist(
        &self,
        lock: &Arc<tokio::sync::Mutex<()>>,
        owner_aid: &Aid,
        space_type: SpaceType,
        signing_key: &SigningKey,
    ) -> Result<Space, ManagerError> {
        let _guard = lock.lock().await;

        // Another request may have completed while we waited.
        if let Some(space) = self.lookup(owner_aid, space_type)? {
            counter!("space_manager.ensure.hits").increment(1);
            return Ok(space);
        }

        let (client, generation) = self.connection.current().await;
        let space = client
            .derive_space(owner_aid, space_type, signing_key)
            .await
            .map_err(|e| {
                warn!(
                    owner_aid = %owner_aid,
                    space_type = %space_type,
                    generation = generation.value(),
                    error = %e,
                    "space derivation failed"
                );
                e
            })?;

        self.store.save_space(&space)?;
        counter!("space_manager.spaces.created").increment(1);
        info!(
            owner_aid = %owner_aid,
            space_type = %space_type,
            space_id = %space.space_id,
            "space bound to identity"
        );

        Ok(space)
    }

    /// Apply the ACL grant a credential authorizes
    ///
    /// The schema must map through the configured grant table, and the
    /// recipient must already own a space; grants never create spaces as a
    /// side effect, so a missing space fails loudly.
    pub async fn grant_access(
        &self,
        credential: &Credential,
        requesting_peer: &PeerId,
    ) -> Result<(), ManagerError> {
        let permissions = self
            .config
            .schema_grants
            .permissions_for(&credential.schema)
            .ok_or_else(|| ManagerError::UnknownSchema(credential.schema.clone()))?;

        let space = if self.is_community_addressed(&credential.recipient) {
            self.community_space().await?
        } else {
            self.store
                .get_user_space(&credential.recipient, SpaceType::Personal)
                .map_err(|e| match e {
                    StoreError::NotFound(_) => {
                        ManagerError::SpaceNotFound(credential.recipient.clone())
                    }
                    other => other.into(),
                })?
        };

        debug!(
            said = %credential.said,
            data = ?credential.data,
            "credential attributes forwarded unchanged"
        );

        let (client, _generation) = self.connection.current().await;
        client
            .add_to_acl(&space.space_id, requesting_peer, permissions)
            .await
            .map_err(|e| {
                warn!(
                    said = %credential.said,
                    recipient = %credential.recipient,
                    space_id = %space.space_id,
                    error = %e,
                    "ACL grant failed"
                );
                e
            })?;

        counter!("space_manager.acl.grants").increment(1);
        info!(
            said = %credential.said,
            schema = %credential.schema,
            space_id = %space.space_id,
            peer_id = %requesting_peer,
            "ACL grant applied"
        );

        Ok(())
    }

    /// The organization-wide shared space
    ///
    /// Pure lookup of the configured identifier; no derivation. The record
    /// is persisted once under `(org_aid, Community)` so `created_at` is
    /// set exactly once; concurrent first calls serialize on the same
    /// per-key mutex as `ensure_user_space`.
    pub async fn community_space(&self) -> Result<Space, ManagerError> {
        let space_id = self
            .config
            .community_space_id
            .clone()
            .ok_or(ManagerError::NotConfigured)?;
        let org_aid = self
            .config
            .org_aid
            .clone()
            .ok_or(ManagerError::NotConfigured)?;

        if let Some(space) = self.lookup_community(&org_aid, &space_id)? {
            return Ok(space);
        }

        let key = (org_aid.clone(), SpaceType::Community);
        let lock = self.ensure_lock(&key);
        let result = self.persist_community(&lock, space_id, org_aid).await;
        self.release_lock(&key, &lock);
        result
    }

    /// A stored record is served only when it carries the configured
    /// identifier; anything else (including a record from an older
    /// configuration) is the not-yet-persisted case.
    fn lookup_community(
        &self,
        org_aid: &Aid,
        space_id: &SpaceId,
    ) -> Result<Option<Space>, ManagerError> {
        match self.store.get_user_space(org_aid, SpaceType::Community) {
            Ok(space) if &space.space_id == space_id => Ok(Some(space)),
            Ok(stale) => {
                warn!(
                    stored = %stale.space_id,
                    configured = %space_id,
                    "stored community record does not match configuration"
                );
                Ok(None)
            }
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist_community(
        &self,
        lock: &Arc<tokio::sync::Mutex<()>>,
        space_id: SpaceId,
        org_aid: Aid,
    ) -> Result<Space, ManagerError> {
        let _guard = lock.lock().await;

        if let Some(space) = self.lookup_community(&org_aid, &space_id)? {
            return Ok(space);
        }

        let space = Space::new(space_id, org_aid, SpaceType::Community);
        self.store.save_space(&space)?;
        info!(space_id = %space.space_id, "community space record persisted");
        Ok(space)
    }

    fn is_community_addressed(&self, recipient: &Aid) -> bool {
        self.config
            .org_aid
            .as_ref()
            .map(|org| org == recipient)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_credential::{Permission, Said};
    use crate::core_space::storage::SpaceSqlStore;
    use crate::core_sync::MemorySyncClient;

    fn key_for(aid: &str) -> SigningKey {
        SigningKey::new(Aid::new(aid), vec![0x42])
    }

    fn manager_config(community: Option<(&str, &str)>) -> ManagerConfig {
        let mut config = Config::default();
        if let Some((space_id, org_aid)) = community {
            config.community.space_id = Some(space_id.to_string());
            config.community.org_aid = Some(org_aid.to_string());
        }
        ManagerConfig::from_config(&config).unwrap()
    }

    fn setup(community: Option<(&str, &str)>) -> (SpaceAccessManager, Arc<MemorySyncClient>) {
        let client = Arc::new(MemorySyncClient::new());
        let connection = Arc::new(SyncConnection::new(client.clone()));
        let store = Arc::new(SpaceSqlStore::memory().unwrap());
        let manager = SpaceAccessManager::new(connection, store, manager_config(community));
        (manager, client)
    }

    fn membership_credential(recipient: &str) -> Credential {
        Credential::new(
            Said::new("EClaimDigest123"),
            Aid::new("EOrgAid"),
            Aid::new(recipient),
            SchemaId::new("EMatouMembershipSchemaV1"),
        )
    }

    #[tokio::test]
    async fn test_ensure_user_space_first_time() {
        let (manager, client) = setup(None);
        let aid = Aid::new("EUser1");

        let space = manager
            .ensure_user_space(&aid, SpaceType::Personal, &key_for("EUser1"))
            .await
            .unwrap();

        assert_eq!(space.space_id.as_str(), "space_personal_EUser1_1");
        assert_eq!(space.owner_aid, aid);
        assert_eq!(space.space_type, SpaceType::Personal);
        assert_eq!(client.derive_calls(), 1);
    }

    #[tokio::test]
    async fn test_ensure_user_space_fast_path_skips_network() {
        let (manager, client) = setup(None);
        let aid = Aid::new("EUser1");
        let key = key_for("EUser1");

        let first = manager
            .ensure_user_space(&aid, SpaceType::Personal, &key)
            .await
            .unwrap();
        let second = manager
            .ensure_user_space(&aid, SpaceType::Personal, &key)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(client.derive_calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_ensure_single_record() {
        let (manager, client) = setup(None);
        let manager = Arc::new(manager);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let manager = Arc::clone(&manager);
            handles.push(tokio::spawn(async move {
                manager
                    .ensure_user_space(
                        &Aid::new("EUser1"),
                        SpaceType::Personal,
                        &key_for("EUser1"),
                    )
                    .await
                    .unwrap()
            }));
        }

        let mut spaces = Vec::new();
        for handle in handles {
            spaces.push(handle.await.unwrap());
        }

        // All callers observed the same record and the network saw exactly
        // one derivation.
        assert!(spaces.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(client.derive_calls(), 1);

        let (facade, _) = manager.client().await;
        let derived = facade
            .derive_space_id(&Aid::new("EUser1"), SpaceType::Personal, &key_for("EUser1"))
            .await
            .unwrap();
        assert_eq!(spaces[0].space_id, derived);
    }

    #[tokio::test]
    async fn test_lock_table_pruned_after_use() {
        let (manager, _client) = setup(None);

        manager
            .ensure_user_space(&Aid::new("EUser1"), SpaceType::Personal, &key_for("EUser1"))
            .await
            .unwrap();
        manager
            .ensure_user_space(&Aid::new("EUser2"), SpaceType::Personal, &key_for("EUser2"))
            .await
            .unwrap();

        assert_eq!(manager.lock_entries(), 0);
    }

    #[tokio::test]
    async fn test_grant_requires_existing_space() {
        let (manager, client) = setup(None);

        let result = manager
            .grant_access(&membership_credential("EUser1"), &PeerId::new("peer-abc"))
            .await;

        assert!(matches!(result, Err(ManagerError::SpaceNotFound(_))));
        assert_eq!(client.acl_calls(), 0);
    }

    #[tokio::test]
    async fn test_grant_unknown_schema() {
        let (manager, _client) = setup(None);
        manager
            .ensure_user_space(&Aid::new("EUser1"), SpaceType::Personal, &key_for("EUser1"))
            .await
            .unwrap();

        let mut credential = membership_credential("EUser1");
        credential.schema = SchemaId::new("EUnknownSchemaV1");

        let result = manager
            .grant_access(&credential, &PeerId::new("peer-abc"))
            .await;
        assert!(matches!(result, Err(ManagerError::UnknownSchema(_))));
    }

    #[tokio::test]
    async fn test_membership_grant_targets_recipient_space() {
        let (manager, client) = setup(None);
        let space = manager
            .ensure_user_space(&Aid::new("EUser1"), SpaceType::Personal, &key_for("EUser1"))
            .await
            .unwrap();

        manager
            .grant_access(&membership_credential("EUser1"), &PeerId::new("peer-abc"))
            .await
            .unwrap();

        let entries = client.acl_entries(&space.space_id);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].peer_id, PeerId::new("peer-abc"));
        assert_eq!(entries[0].permissions, vec![Permission::Read, Permission::Write]);
    }

    #[tokio::test]
    async fn test_community_space_not_configured() {
        let (manager, _client) = setup(None);
        let result = manager.community_space().await;
        assert!(matches!(result, Err(ManagerError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_community_space_fixed_lookup() {
        let (manager, _client) = setup(Some(("space_community_EOrgAid_1", "EOrgAid")));

        let first = manager.community_space().await.unwrap();
        let second = manager.community_space().await.unwrap();

        assert_eq!(first.space_id.as_str(), "space_community_EOrgAid_1");
        assert_eq!(first.space_type, SpaceType::Community);
        assert_eq!(first.created_at, second.created_at);
    }

    #[tokio::test]
    async fn test_community_space_survives_org_personal_onboarding() {
        let (manager, _client) = setup(Some(("space_community_EOrgAid_1", "EOrgAid")));

        let community = manager.community_space().await.unwrap();

        // The organization identity onboards its own personal space.
        let personal = manager
            .ensure_user_space(&Aid::new("EOrgAid"), SpaceType::Personal, &key_for("EOrgAid"))
            .await
            .unwrap();
        assert_eq!(personal.space_id.as_str(), "space_personal_EOrgAid_1");

        // The community record is untouched by the personal one.
        let again = manager.community_space().await.unwrap();
        assert_eq!(again.space_id.as_str(), "space_community_EOrgAid_1");
        assert_eq!(again.space_type, SpaceType::Community);
        assert_eq!(again.created_at, community.created_at);
    }

    #[tokio::test]
    async fn test_concurrent_community_space_single_record() {
        let (manager, _client) = setup(Some(("space_community_EOrgAid_1", "EOrgAid")));
        let manager = Arc::new(manager);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let manager = Arc::clone(&manager);
            handles.push(tokio::spawn(
                async move { manager.community_space().await.unwrap() },
            ));
        }

        let mut spaces = Vec::new();
        for handle in handles {
            spaces.push(handle.await.unwrap());
        }

        // One record, one creation time, observed identically by everyone.
        assert!(spaces.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_community_addressed_grant_routes_to_community_space() {
        let (manager, client) = setup(Some(("space_community_EOrgAid_1", "EOrgAid")));

        // The community space must exist on the network for the ACL append.
        let key = key_for("EOrgAid");
        let (facade, _) = manager.client().await;
        facade
            .create_space(&Aid::new("EOrgAid"), SpaceType::Community, &key)
            .await
            .unwrap();

        manager
            .grant_access(&membership_credential("EOrgAid"), &PeerId::new("peer-abc"))
            .await
            .unwrap();

        let entries = client.acl_entries(&SpaceId::new("space_community_EOrgAid_1"));
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_community_grant_unaffected_by_org_personal_space() {
        let (manager, client) = setup(Some(("space_community_EOrgAid_1", "EOrgAid")));
        let key = key_for("EOrgAid");

        let (facade, _) = manager.client().await;
        facade
            .create_space(&Aid::new("EOrgAid"), SpaceType::Community, &key)
            .await
            .unwrap();

        // Org onboards a personal space before any community grant lands.
        let personal = manager
            .ensure_user_space(&Aid::new("EOrgAid"), SpaceType::Personal, &key)
            .await
            .unwrap();

        manager
            .grant_access(&membership_credential("EOrgAid"), &PeerId::new("peer-abc"))
            .await
            .unwrap();

        // The grant lands on the fixed community identifier, never on the
        // org's personal space.
        let community_entries =
            client.acl_entries(&SpaceId::new("space_community_EOrgAid_1"));
        assert_eq!(community_entries.len(), 1);
        assert!(client.acl_entries(&personal.space_id).is_empty());
    }

    #[tokio::test]
    async fn test_reinitialize_bumps_generation() {
        let (manager, old) = setup(None);

        let generation = manager
            .reinitialize(Arc::new(MemorySyncClient::new()))
            .await
            .unwrap();

        assert_eq!(generation.value(), 1);
        assert!(old.is_closed());
    }
}
