//! AnchorSpace core library
//!
//! Binds a decentralized identity (AID) to exactly one deterministic
//! collaborative synchronization space per space type, mediates
//! credential-gated ACL changes on that space, and persists the
//! identity-to-space mapping.

pub mod config;
pub mod core_credential;
pub mod core_identity;
pub mod core_space;
pub mod core_sync;
pub mod logging;
pub mod metrics;

pub use config::Config;
pub use core_space::manager::{ManagerError, SpaceAccessManager};
pub use logging::{init_logging, LogLevel};
