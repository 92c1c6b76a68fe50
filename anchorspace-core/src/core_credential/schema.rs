//! Credential schemas and the schema-to-permission grant table

use crate::config::GrantsConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies the semantic type of a credential
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaId(String);

impl SchemaId {
    /// Wrap a schema identifier
    pub fn new(s: impl Into<String>) -> Self {
        SchemaId(s.into())
    }

    /// Get the string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One capability within an ACL grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Read documents in the space
    Read,
    /// Write documents in the space
    Write,
    /// Administer the space ACL
    Admin,
}

impl Permission {
    /// Stable string form used on the wire and in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Admin => "admin",
        }
    }

    /// Parse a configured permission name
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "read" => Some(Permission::Read),
            "write" => Some(Permission::Write),
            "admin" => Some(Permission::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static schema-to-permission table
///
/// Built from configuration at manager construction. Lookup misses are
/// surfaced as unknown-schema errors by the manager, never defaulted.
#[derive(Debug, Clone, Default)]
pub struct SchemaGrants {
    grants: BTreeMap<SchemaId, Vec<Permission>>,
}

impl SchemaGrants {
    /// Build the table from the grants section of the configuration
    ///
    /// Unrecognized permission names are rejected so a typo in the config
    /// fails loudly at startup instead of silently dropping a capability.
    pub fn from_config(config: &GrantsConfig) -> Result<Self, String> {
        let mut grants = BTreeMap::new();
        for (schema, names) in &config.schemas {
            let mut permissions = Vec::with_capacity(names.len());
            for name in names {
                let permission = Permission::from_str(name).ok_or_else(|| {
                    format!("unknown permission {:?} for schema {}", name, schema)
                })?;
                if !permissions.contains(&permission) {
                    permissions.push(permission);
                }
            }
            grants.insert(SchemaId::new(schema.clone()), permissions);
        }
        Ok(Self { grants })
    }

    /// Permissions mapped to a schema, if any
    pub fn permissions_for(&self, schema: &SchemaId) -> Option<&[Permission]> {
        self.grants.get(schema).map(|p| p.as_slice())
    }

    /// Number of configured schema mappings
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Whether no mappings are configured
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_string_forms() {
        assert_eq!(Permission::Read.as_str(), "read");
        assert_eq!(Permission::from_str("admin"), Some(Permission::Admin));
        assert_eq!(Permission::from_str("root"), None);
    }

    #[test]
    fn test_grants_from_default_config() {
        let grants = SchemaGrants::from_config(&GrantsConfig::default()).unwrap();

        let membership = grants
            .permissions_for(&SchemaId::new("EMatouMembershipSchemaV1"))
            .unwrap();
        assert_eq!(membership, &[Permission::Read, Permission::Write]);

        let steward = grants
            .permissions_for(&SchemaId::new("EMatouStewardSchemaV1"))
            .unwrap();
        assert_eq!(
            steward,
            &[Permission::Read, Permission::Write, Permission::Admin]
        );

        assert!(grants
            .permissions_for(&SchemaId::new("EUnknownSchemaV1"))
            .is_none());
    }

    #[test]
    fn test_grants_reject_unknown_permission_name() {
        let mut config = GrantsConfig::default();
        config
            .schemas
            .insert("EBadSchemaV1".to_string(), vec!["sudo".to_string()]);

        assert!(SchemaGrants::from_config(&config).is_err());
    }

    #[test]
    fn test_grants_deduplicate_preserving_order() {
        let mut config = GrantsConfig::default();
        config.schemas.insert(
            "EDupSchemaV1".to_string(),
            vec!["write".to_string(), "read".to_string(), "write".to_string()],
        );

        let grants = SchemaGrants::from_config(&config).unwrap();
        let permissions = grants
            .permissions_for(&SchemaId::new("EDupSchemaV1"))
            .unwrap();
        assert_eq!(permissions, &[Permission::Write, Permission::Read]);
    }
}
