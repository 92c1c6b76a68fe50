//! Error types for the synchronization facade

use thiserror::Error;

/// Errors surfaced by the synchronization client facade
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// Network unreachable; retryable with backoff
    #[error("Connection error: {0}")]
    Connection(String),

    /// Signing key does not authenticate as the claimed identity; fatal
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Space or document unknown to the network
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client has been closed; operations must re-resolve the current handle
    #[error("Sync client is closed")]
    Closed,

    /// Facade is mid-reinitialization; retryable after backoff. Surfaced
    /// by network-backed clients while a reconnect is in flight; the
    /// in-process swap path reports `Closed` instead.
    #[error("Sync client is reconnecting")]
    Reconnecting,
}

impl SyncError {
    /// Whether a caller may retry the operation after backoff
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Connection(_) | SyncError::Closed | SyncError::Reconnecting
        )
    }
}

/// Result type for facade operations
pub type SyncResult<T> = Result<T, SyncError>;
