//! Credential value type

use super::{Said, SchemaId};
use crate::core_identity::Aid;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A verifiable claim consumed as an authorization token
///
/// Signature validity and schema semantics are guaranteed by the external
/// issuer; the manager reads only the routing fields (`recipient`,
/// `schema`) and treats `data` as opaque. Credentials are presented once
/// per grant and never persisted here; only the resulting ACL effect is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Content-derived unique identifier
    pub said: Said,

    /// Identity that issued the claim
    pub issuer: Aid,

    /// Identity the claim is addressed to
    pub recipient: Aid,

    /// Semantic type of the claim
    pub schema: SchemaId,

    /// Schema-defined attributes, uninterpreted
    pub data: Map<String, Value>,
}

impl Credential {
    /// Assemble a credential from issuer-provided parts
    pub fn new(said: Said, issuer: Aid, recipient: Aid, schema: SchemaId) -> Self {
        Self {
            said,
            issuer,
            recipient,
            schema,
            data: Map::new(),
        }
    }

    /// Attach schema-defined attribute data
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn membership_credential() -> Credential {
        Credential::new(
            Said::new("EClaimDigest123"),
            Aid::new("EOrgAid"),
            Aid::new("EUser1"),
            SchemaId::new("EMatouMembershipSchemaV1"),
        )
    }

    #[test]
    fn test_credential_fields() {
        let cred = membership_credential();
        assert_eq!(cred.issuer, Aid::new("EOrgAid"));
        assert_eq!(cred.recipient, Aid::new("EUser1"));
        assert_eq!(cred.schema.as_str(), "EMatouMembershipSchemaV1");
        assert!(cred.data.is_empty());
    }

    #[test]
    fn test_credential_data_is_opaque_json() {
        let mut data = Map::new();
        data.insert("displayName".to_string(), json!("User One"));
        data.insert("tier".to_string(), json!(2));

        let cred = membership_credential().with_data(data);
        assert_eq!(cred.data["displayName"], json!("User One"));
    }

    #[test]
    fn test_credential_serde_round_trip() {
        let cred = membership_credential();
        let encoded = serde_json::to_string(&cred).unwrap();
        let decoded: Credential = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.said, cred.said);
        assert_eq!(decoded.schema, cred.schema);
    }
}
