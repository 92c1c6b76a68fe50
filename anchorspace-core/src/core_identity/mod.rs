//! Identity types
//!
//! The identity and credential issuance protocol lives outside this crate;
//! these types carry what the space manager needs: a stable owner key and
//! opaque signing material bound to it.

mod aid;
mod signing;

pub use aid::Aid;
pub use signing::SigningKey;
