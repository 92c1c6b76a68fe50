//! Space model, persistence, and the access manager

pub mod manager;
pub mod space;
pub mod storage;
pub mod store;
pub mod types;

pub use manager::{ManagerConfig, ManagerError, SpaceAccessManager};
pub use space::Space;
pub use store::{SpaceStore, StoreError, StoreResult};
pub use types::{SpaceId, SpaceType, Timestamp};
