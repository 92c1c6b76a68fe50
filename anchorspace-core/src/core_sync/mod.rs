//! Synchronization client facade
//!
//! Capability interface isolating this subsystem from the underlying
//! peer-to-peer synchronization network, plus the generation-tokened shared
//! connection handle and the in-memory test double.

pub mod client;
pub mod connection;
pub mod error;
pub mod memory;
pub mod transfer;

pub use client::{AclEntry, PeerId, SyncClient};
pub use connection::{SyncConnection, SyncGeneration};
pub use error::{SyncError, SyncResult};
pub use memory::MemorySyncClient;
pub use transfer::TransferPool;
