//! Configuration management for AnchorSpace
//!
//! Environment-based configuration with defaults, TOML file loading, and
//! validation. The community-space and schema-grant sections are the
//! injection point for the manager's configuration mode; they are never
//! read from process-global state at runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Synchronization network configuration
    pub network: NetworkConfig,

    /// Store configuration
    pub store: StoreConfig,

    /// Community space configuration
    pub community: CommunityConfig,

    /// Credential schema to permission grants
    pub grants: GrantsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Synchronization network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Coordinator endpoint of the synchronization network
    pub coordinator_url: String,

    /// Connection timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Data directory for persistent storage
    pub data_dir: PathBuf,
}

/// Community space configuration
///
/// When `space_id` is set, the manager serves the organization-wide space
/// under the organization identity; both fields must then be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommunityConfig {
    /// Fixed identifier of the shared community space
    pub space_id: Option<String>,

    /// Organization owner identity (AID)
    pub org_aid: Option<String>,
}

/// Credential schema to ACL permission mapping
///
/// Configuration data, not logic: schemas without an entry are rejected
/// with an unknown-schema error rather than granted a guessed default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantsConfig {
    /// Schema identifier to ordered permission names
    pub schemas: BTreeMap<String, Vec<String>>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            store: StoreConfig::default(),
            community: CommunityConfig::default(),
            grants: GrantsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            coordinator_url: "https://coordinator.localhost:8443".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl Default for GrantsConfig {
    fn default() -> Self {
        let mut schemas = BTreeMap::new();
        schemas.insert(
            "EMatouMembershipSchemaV1".to_string(),
            vec!["read".to_string(), "write".to_string()],
        );
        schemas.insert(
            "EMatouStewardSchemaV1".to_string(),
            vec!["read".to_string(), "write".to_string(), "admin".to_string()],
        );
        schemas.insert(
            "EMatouSelfClaimSchemaV1".to_string(),
            vec!["read".to_string()],
        );
        schemas.insert(
            "EMatouInvitationSchemaV1".to_string(),
            vec!["read".to_string(), "write".to_string()],
        );
        Self { schemas }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: ANCHORSPACE_<SECTION>_<KEY>
    /// Example: ANCHORSPACE_NETWORK_COORDINATOR_URL=https://coord.example:8443
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = env::var("ANCHORSPACE_NETWORK_COORDINATOR_URL") {
            config.network.coordinator_url = url;
        }

        if let Ok(data_dir) = env::var("ANCHORSPACE_STORE_DATA_DIR") {
            config.store.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(space_id) = env::var("ANCHORSPACE_COMMUNITY_SPACE_ID") {
            config.community.space_id = Some(space_id);
        }
        if let Ok(org_aid) = env::var("ANCHORSPACE_COMMUNITY_ORG_AID") {
            config.community.org_aid = Some(org_aid);
        }

        if let Ok(level) = env::var("ANCHORSPACE_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = env::var("ANCHORSPACE_LOG_JSON") {
            config.logging.json_format = json
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid JSON flag: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError(e.to_string()))?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.coordinator_url.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "coordinator_url must not be empty".to_string(),
            ));
        }

        // A community space without an owning organization identity is
        // unusable: grants could not be routed.
        if self.community.space_id.is_some() && self.community.org_aid.is_none() {
            return Err(ConfigError::ValidationFailed(
                "community.space_id set but community.org_aid missing".to_string(),
            ));
        }

        for (schema, permissions) in &self.grants.schemas {
            if permissions.is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "grant mapping for schema {} is empty",
                    schema
                )));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWriteError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.community.space_id.is_none());
    }

    #[test]
    fn test_default_grants_cover_known_schemas() {
        let config = Config::default();
        assert!(config.grants.schemas.contains_key("EMatouMembershipSchemaV1"));
        assert!(config.grants.schemas.contains_key("EMatouStewardSchemaV1"));
        assert_eq!(
            config.grants.schemas["EMatouStewardSchemaV1"],
            vec!["read", "write", "admin"]
        );
    }

    #[test]
    fn test_community_requires_org_aid() {
        let mut config = Config::default();
        config.community.space_id = Some("space_community_org_1".to_string());
        assert!(config.validate().is_err());

        config.community.org_aid = Some("EOrgAid".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_grant_mapping_rejected() {
        let mut config = Config::default();
        config
            .grants
            .schemas
            .insert("EBrokenSchemaV1".to_string(), vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_validation() {
        let mut config = Config::default();

        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "debug".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchorspace.toml");

        let mut config = Config::default();
        config.community.space_id = Some("space_community_org_1".to_string());
        config.community.org_aid = Some("EOrgAid".to_string());

        config.save_to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();

        assert_eq!(loaded.community.space_id, config.community.space_id);
        assert_eq!(loaded.grants.schemas, config.grants.schemas);
    }
}
