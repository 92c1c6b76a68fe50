//! Credential model
//!
//! Value types for verifiable claims consumed as authorization tokens for
//! ACL grants. Issuance, signing, and schema validation happen in the
//! external identity layer; credentials arrive here already verified.

mod credential;
mod said;
mod schema;

pub use credential::Credential;
pub use said::Said;
pub use schema::{Permission, SchemaGrants, SchemaId};
