//! Type definitions for spaces

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for a space
///
/// Derived deterministically by the synchronization network from the owner
/// identity and space type; never chosen locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpaceId(String);

impl SpaceId {
    /// Wrap a network-derived identifier
    pub fn new(s: impl Into<String>) -> Self {
        SpaceId(s.into())
    }

    /// Get the string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SpaceId {
    fn from(s: &str) -> Self {
        SpaceId(s.to_string())
    }
}

/// Kind of space bound to an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceType {
    /// One per user identity
    Personal,
    /// The organization-wide shared space
    Community,
}

impl SpaceType {
    /// Stable string form used in derivation and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            SpaceType::Personal => "personal",
            SpaceType::Community => "community",
        }
    }

    /// Parse the stable string form
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "personal" => Some(SpaceType::Personal),
            "community" => Some(SpaceType::Community),
            _ => None,
        }
    }
}

impl fmt::Display for SpaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Millisecond wall-clock timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Current wall-clock time
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Timestamp(millis)
    }

    /// Milliseconds since the Unix epoch
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Construct from milliseconds since the Unix epoch
    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_type_string_round_trip() {
        assert_eq!(SpaceType::from_str("personal"), Some(SpaceType::Personal));
        assert_eq!(SpaceType::from_str("community"), Some(SpaceType::Community));
        assert_eq!(SpaceType::from_str("team"), None);
        assert_eq!(SpaceType::Personal.as_str(), "personal");
    }

    #[test]
    fn test_space_id_display() {
        let id = SpaceId::new("space_personal_EUser1_1");
        assert_eq!(format!("{}", id), "space_personal_EUser1_1");
    }

    #[test]
    fn test_timestamp_round_trip() {
        let ts = Timestamp::from_millis(1_700_000_000_000);
        assert_eq!(ts.as_millis(), 1_700_000_000_000);
        assert_eq!(ts, Timestamp::from_millis(ts.as_millis()));
    }

    #[test]
    fn test_timestamp_now_is_monotonic_enough() {
        let a = Timestamp::now();
        let b = Timestamp::now();
        assert!(b >= a);
    }
}
