//! Self-addressing identifier
//!
//! Content-derived unique key of a credential. The digest is computed by
//! the issuer; this subsystem never recomputes it, only keys by it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content-derived unique identifier of a credential
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Said(String);

impl Said {
    /// Wrap an issuer-provided identifier
    pub fn new(s: impl Into<String>) -> Self {
        Said(s.into())
    }

    /// Get the string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Said {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
