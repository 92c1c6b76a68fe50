//! Generation-tokened shared connection handle
//!
//! The underlying network client is a single exclusively-owned resource.
//! Dependents never cache the raw handle; they hold the connection and
//! re-resolve `current()` so a reinitialization (close and replace) is
//! observed instead of silently operating on a superseded instance.

use super::client::SyncClient;
use super::error::SyncResult;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Version token identifying one lifetime of the underlying client
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SyncGeneration(u64);

impl SyncGeneration {
    /// Raw counter value, for logging
    pub fn value(&self) -> u64 {
        self.0
    }
}

struct ConnectionState {
    client: Arc<dyn SyncClient>,
    generation: SyncGeneration,
}

/// Shared handle to the current synchronization client
pub struct SyncConnection {
    state: RwLock<ConnectionState>,
}

impl SyncConnection {
    /// Wrap an initial client
    pub fn new(client: Arc<dyn SyncClient>) -> Self {
        Self {
            state: RwLock::new(ConnectionState {
                client,
                generation: SyncGeneration(0),
            }),
        }
    }

    /// The current client together with its generation token
    pub async fn current(&self) -> (Arc<dyn SyncClient>, SyncGeneration) {
        let state = self.state.read().await;
        (Arc::clone(&state.client), state.generation)
    }

    /// The current generation token
    pub async fn generation(&self) -> SyncGeneration {
        self.state.read().await.generation
    }

    /// Replace the underlying client, closing the superseded one
    ///
    /// The swap is a single exclusive transition: in-flight operations that
    /// captured the old handle fail fast with `Closed` from the closed
    /// client, and dependents observe the bumped generation on their next
    /// resolution. The old client's close error does not abort the swap.
    pub async fn replace(&self, new_client: Arc<dyn SyncClient>) -> SyncResult<SyncGeneration> {
        let mut state = self.state.write().await;

        if let Err(e) = state.client.close().await {
            tracing::warn!(error = %e, "closing superseded sync client failed");
        }

        state.client = new_client;
        state.generation = SyncGeneration(state.generation.0 + 1);

        tracing::info!(generation = state.generation.0, "sync client replaced");
        Ok(state.generation)
    }
}
