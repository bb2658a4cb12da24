//! Database Interface Types
//!
//! Common types and constants used throughout the database interface.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const OGS_MAX_SQN: u64 = 0xFFFF_FFFF_FFFF; // 48-bit max

// MongoDB field names
pub const OGS_IMSI_STRING: &str = "imsi";
pub const OGS_SECURITY_STRING: &str = "security";
pub const OGS_K_STRING: &str = "k";
pub const OGS_OPC_STRING: &str = "opc";
pub const OGS_OP_STRING: &str = "op";
pub const OGS_AMF_STRING: &str = "amf";
pub const OGS_SQN_STRING: &str = "sqn";

/// Authentication method supported for vector generation
pub const OGS_AUTH_METHOD_5G_AKA: &str = "5G_AKA";

/// How the stored operator key is to be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OperatorKeyType {
    /// Operator variant OP; OPc is derived per request
    #[serde(rename = "OP")]
    Op,
    /// Precomputed OPc
    #[default]
    #[serde(rename = "OPC")]
    Opc,
}

/// Authentication subscription of one subscriber
///
/// Key material is kept as stored (hex text) and validated by the
/// consumer. Secrets never appear in `Debug` output and are wiped when
/// the record is dropped.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationSubscription {
    #[zeroize(skip)]
    pub supi: String,
    #[serde(default)]
    pub permanent_key: String,
    #[serde(default)]
    pub operator_key: String,
    #[serde(default)]
    #[zeroize(skip)]
    pub operator_key_type: OperatorKeyType,
    #[serde(default)]
    #[zeroize(skip)]
    pub sequence_number: String,
    #[serde(default)]
    #[zeroize(skip)]
    pub authentication_management_field: String,
    #[serde(default = "default_authentication_method")]
    #[zeroize(skip)]
    pub authentication_method: String,
}

fn default_authentication_method() -> String {
    OGS_AUTH_METHOD_5G_AKA.to_string()
}

impl std::fmt::Debug for AuthenticationSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationSubscription")
            .field("supi", &self.supi)
            .field("operator_key_type", &self.operator_key_type)
            .field("sequence_number", &self.sequence_number)
            .field("authentication_management_field", &self.authentication_management_field)
            .field("authentication_method", &self.authentication_method)
            .finish_non_exhaustive()
    }
}

/// Helper function to parse SUPI type (e.g., "imsi" from "imsi-123456789012345")
pub fn ogs_id_get_type(supi: &str) -> Option<&str> {
    supi.split_once('-').map(|(t, _)| t)
}

/// Helper function to parse SUPI value (e.g., "123456789012345" from "imsi-123456789012345")
pub fn ogs_id_get_value(supi: &str) -> Option<&str> {
    supi.split_once('-').map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supi_parsing() {
        assert_eq!(ogs_id_get_type("imsi-001010000000001"), Some("imsi"));
        assert_eq!(ogs_id_get_value("imsi-001010000000001"), Some("001010000000001"));
        assert_eq!(ogs_id_get_type("001010000000001"), None);
        assert_eq!(ogs_id_get_value("001010000000001"), None);
    }

    #[test]
    fn test_subscription_defaults() {
        let json = r#"{
            "supi": "imsi-001010000000001",
            "permanentKey": "465B5CE8B199B49FAA5F0A2EE238A6BC",
            "operatorKey": "CD63CB71954A9F4E48A5994E37A02BAF",
            "sequenceNumber": "FF9BB4D0B607",
            "authenticationManagementField": "B9B9"
        }"#;
        let sub: AuthenticationSubscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.operator_key_type, OperatorKeyType::Opc);
        assert_eq!(sub.authentication_method, "5G_AKA");

        let json = r#"{"supi": "imsi-1", "operatorKeyType": "OP"}"#;
        let sub: AuthenticationSubscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.operator_key_type, OperatorKeyType::Op);
        assert!(sub.permanent_key.is_empty());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let sub = AuthenticationSubscription {
            supi: "imsi-001010000000001".to_string(),
            permanent_key: "465B5CE8B199B49FAA5F0A2EE238A6BC".to_string(),
            operator_key: "CD63CB71954A9F4E48A5994E37A02BAF".to_string(),
            operator_key_type: OperatorKeyType::Opc,
            sequence_number: "000000000001".to_string(),
            authentication_management_field: "8000".to_string(),
            authentication_method: "5G_AKA".to_string(),
        };
        let debug = format!("{:?}", sub);
        assert!(debug.contains("imsi-001010000000001"));
        assert!(!debug.contains("465B5CE8"));
        assert!(!debug.contains("CD63CB71"));
    }
}
