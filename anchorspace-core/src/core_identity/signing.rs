//! Signing key handle
//!
//! Opaque signing material bound to an AID. Signing itself happens in the
//! external identity layer; the facade only checks that the key claims the
//! identity it is used for. Secret bytes are kept behind `secrecy` so they
//! never show up in logs or serialized output.

use super::Aid;
use secrecy::{ExposeSecret, Secret};
use std::fmt;

/// Signing key material bound to an identity
pub struct SigningKey {
    aid: Aid,
    seed: Secret<Vec<u8>>,
}

impl SigningKey {
    /// Wrap raw key material for the given identity
    pub fn new(aid: Aid, seed: Vec<u8>) -> Self {
        Self {
            aid,
            seed: Secret::new(seed),
        }
    }

    /// The identity this key authenticates as
    pub fn aid(&self) -> &Aid {
        &self.aid
    }

    /// Whether this key claims the given identity
    pub fn authenticates(&self, aid: &Aid) -> bool {
        &self.aid == aid
    }

    /// Expose the raw seed for handing to the external signer
    pub fn expose_seed(&self) -> &[u8] {
        self.seed.expose_secret()
    }
}

impl Clone for SigningKey {
    fn clone(&self) -> Self {
        Self {
            aid: self.aid.clone(),
            seed: Secret::new(self.seed.expose_secret().clone()),
        }
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("aid", &self.aid)
            .field("seed", &"[REDACTED]")
            .finish()
    }
}
