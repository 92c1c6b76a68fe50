//! Document transfer pool
//!
//! Upload helper for document payloads. Holds the shared connection rather
//! than a raw client handle: the cached handle is revalidated against the
//! connection's generation on every upload, so a facade reinitialization
//! invalidates the cache instead of leaving uploads bound to a closed
//! network instance.

use super::client::SyncClient;
use super::connection::{SyncConnection, SyncGeneration};
use super::error::SyncResult;
use crate::core_space::SpaceId;
use std::sync::Arc;
use tokio::sync::Mutex;

struct CachedClient {
    client: Arc<dyn SyncClient>,
    generation: SyncGeneration,
}

/// Pool of upload capacity bound to the current sync client
pub struct TransferPool {
    connection: Arc<SyncConnection>,
    cached: Mutex<Option<CachedClient>>,
}

impl TransferPool {
    /// Create a pool resolving through the given connection
    pub fn new(connection: Arc<SyncConnection>) -> Self {
        Self {
            connection,
            cached: Mutex::new(None),
        }
    }

    async fn resolve(&self) -> (Arc<dyn SyncClient>, SyncGeneration) {
        let current_generation = self.connection.generation().await;
        let mut cached = self.cached.lock().await;

        match cached.as_ref() {
            Some(entry) if entry.generation == current_generation => {
                (Arc::clone(&entry.client), entry.generation)
            }
            _ => {
                let (client, generation) = self.connection.current().await;
                tracing::debug!(
                    generation = generation.value(),
                    "transfer pool rebinding to current sync client"
                );
                *cached = Some(CachedClient {
                    client: Arc::clone(&client),
                    generation,
                });
                (client, generation)
            }
        }
    }

    /// Upload a document payload through the current client
    pub async fn upload(&self, space_id: &SpaceId, doc_id: &str, data: &[u8]) -> SyncResult<()> {
        let (client, _generation) = self.resolve().await;
        client.sync_document(space_id, doc_id, data).await
    }

    /// Generation the pool is currently bound to, if any
    pub async fn bound_generation(&self) -> Option<SyncGeneration> {
        self.cached.lock().await.as_ref().map(|c| c.generation)
    }
}
