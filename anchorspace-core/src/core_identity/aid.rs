//! AID module
//!
//! Defines the stable identity identifier that anchors space ownership.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Aid is the stable identity string owning spaces and receiving credentials
///
/// Treated as opaque: derivation and rotation belong to the external
/// identity protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Aid(String);

impl Aid {
    /// Create an Aid from its string form
    pub fn new(s: impl Into<String>) -> Self {
        Aid(s.into())
    }

    /// Parse from a string, rejecting empty identifiers
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("AID must not be empty".to_string());
        }
        Ok(Aid(s.to_string()))
    }

    /// Get the string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Aid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Aid {
    fn from(s: &str) -> Self {
        Aid(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aid_round_trip() {
        let aid = Aid::new("EUser1");
        assert_eq!(aid.as_str(), "EUser1");
        assert_eq!(format!("{}", aid), "EUser1");
    }

    #[test]
    fn test_aid_parse_rejects_empty() {
        assert!(Aid::parse("").is_err());
        assert!(Aid::parse("EUser1").is_ok());
    }

    #[test]
    fn test_aid_equality() {
        assert_eq!(Aid::new("EUser1"), Aid::from("EUser1"));
        assert_ne!(Aid::new("EUser1"), Aid::new("EUser2"));
    }
}
