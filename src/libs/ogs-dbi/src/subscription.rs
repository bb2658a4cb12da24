//! Subscription Database Queries
//!
//! The UDM reads a subscriber's authentication subscription and writes
//! back the sequence number after each issued vector. Both operations go
//! through [`AuthSubscriptionStore`] so the daemon can run against MongoDB
//! or against subscribers provisioned in its configuration file.

use std::collections::HashMap;
use std::sync::RwLock;

use mongodb::bson::{doc, Bson, Document};

use crate::mongoc::{DbiError, DbiResult, MongoDbi};
use crate::types::*;

/// Access to authentication subscriptions
///
/// Implementations must be usable from blocking worker threads.
pub trait AuthSubscriptionStore: Send + Sync {
    /// Load the authentication subscription of `supi`
    ///
    /// Returns `DbiError::SubscriberNotFound` when no record exists.
    fn auth_subscription(&self, supi: &str) -> DbiResult<AuthenticationSubscription>;

    /// Persist a new sequence number (12 hex digits) for `supi`
    fn update_sqn(&self, supi: &str, sqn: &str) -> DbiResult<()>;
}

fn parse_sqn_hex(sqn: &str) -> DbiResult<u64> {
    let value = u64::from_str_radix(sqn, 16)
        .map_err(|_| DbiError::ParseError(format!("SQN '{}'", sqn)))?;
    if sqn.len() != 12 || value > OGS_MAX_SQN {
        return Err(DbiError::ParseError(format!("SQN '{}'", sqn)));
    }
    Ok(value)
}

fn supi_query(supi: &str) -> DbiResult<Document> {
    let supi_type = ogs_id_get_type(supi).ok_or_else(|| DbiError::InvalidSupi(supi.to_string()))?;
    let supi_id = ogs_id_get_value(supi).ok_or_else(|| DbiError::InvalidSupi(supi.to_string()))?;
    Ok(doc! { supi_type: supi_id })
}

/// Map a subscriber document's `security` section onto the record
///
/// `security.opc` takes precedence over `security.op`. The SQN is stored
/// as a number and surfaced as 12 uppercase hex digits.
fn parse_security(supi: &str, document: &Document) -> DbiResult<AuthenticationSubscription> {
    let security = document
        .get_document(OGS_SECURITY_STRING)
        .map_err(|_| DbiError::FieldNotFound(OGS_SECURITY_STRING.to_string()))?;

    let (operator_key, operator_key_type) = match (
        security.get_str(OGS_OPC_STRING),
        security.get_str(OGS_OP_STRING),
    ) {
        (Ok(opc), _) => (opc.to_string(), OperatorKeyType::Opc),
        (Err(_), Ok(op)) => (op.to_string(), OperatorKeyType::Op),
        _ => (String::new(), OperatorKeyType::Opc),
    };

    let sequence_number = match security.get(OGS_SQN_STRING) {
        Some(Bson::Int64(v)) => format!("{:012X}", *v as u64 & OGS_MAX_SQN),
        Some(Bson::Int32(v)) => format!("{:012X}", *v as u64 & OGS_MAX_SQN),
        Some(Bson::Double(v)) => format!("{:012X}", *v as u64 & OGS_MAX_SQN),
        Some(Bson::String(s)) => s.to_uppercase(),
        _ => String::new(),
    };

    Ok(AuthenticationSubscription {
        supi: supi.to_string(),
        permanent_key: security.get_str(OGS_K_STRING).unwrap_or_default().to_string(),
        operator_key,
        operator_key_type,
        sequence_number,
        authentication_management_field: security
            .get_str(OGS_AMF_STRING)
            .unwrap_or_default()
            .to_string(),
        authentication_method: OGS_AUTH_METHOD_5G_AKA.to_string(),
    })
}

impl AuthSubscriptionStore for MongoDbi {
    fn auth_subscription(&self, supi: &str) -> DbiResult<AuthenticationSubscription> {
        let document = self
            .subscribers
            .find_one(supi_query(supi)?, None)?
            .ok_or_else(|| DbiError::SubscriberNotFound(supi.to_string()))?;

        parse_security(supi, &document)
    }

    fn update_sqn(&self, supi: &str, sqn: &str) -> DbiResult<()> {
        let value = parse_sqn_hex(sqn)?;
        let update = doc! {
            "$set": {
                format!("{}.{}", OGS_SECURITY_STRING, OGS_SQN_STRING): value as i64
            }
        };

        let result = self.subscribers.update_one(supi_query(supi)?, update, None)?;
        if result.matched_count == 0 {
            return Err(DbiError::SubscriberNotFound(supi.to_string()));
        }
        Ok(())
    }
}

/// In-memory subscriber database
#[derive(Debug, Default)]
pub struct MemoryDbi {
    subscribers: RwLock<HashMap<String, AuthenticationSubscription>>,
}

impl MemoryDbi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `subscriptions`
    pub fn with_subscriptions(
        subscriptions: impl IntoIterator<Item = AuthenticationSubscription>,
    ) -> Self {
        let store = Self::new();
        for sub in subscriptions {
            store.insert(sub);
        }
        store
    }

    /// Add or replace a subscriber
    pub fn insert(&self, subscription: AuthenticationSubscription) {
        let mut subscribers = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subscribers.insert(subscription.supi.clone(), subscription);
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuthSubscriptionStore for MemoryDbi {
    fn auth_subscription(&self, supi: &str) -> DbiResult<AuthenticationSubscription> {
        self.subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(supi)
            .cloned()
            .ok_or_else(|| DbiError::SubscriberNotFound(supi.to_string()))
    }

    fn update_sqn(&self, supi: &str, sqn: &str) -> DbiResult<()> {
        parse_sqn_hex(sqn)?;
        let mut subscribers = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        let sub = subscribers
            .get_mut(supi)
            .ok_or_else(|| DbiError::SubscriberNotFound(supi.to_string()))?;
        sub.sequence_number = sqn.to_uppercase();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(supi: &str) -> AuthenticationSubscription {
        AuthenticationSubscription {
            supi: supi.to_string(),
            permanent_key: "465B5CE8B199B49FAA5F0A2EE238A6BC".to_string(),
            operator_key: "CD63CB71954A9F4E48A5994E37A02BAF".to_string(),
            operator_key_type: OperatorKeyType::Opc,
            sequence_number: "000000000020".to_string(),
            authentication_management_field: "8000".to_string(),
            authentication_method: OGS_AUTH_METHOD_5G_AKA.to_string(),
        }
    }

    #[test]
    fn test_memory_dbi_lookup() {
        let store = MemoryDbi::with_subscriptions([subscription("imsi-001010000000001")]);
        assert_eq!(store.len(), 1);

        let sub = store.auth_subscription("imsi-001010000000001").unwrap();
        assert_eq!(sub.sequence_number, "000000000020");

        assert!(matches!(
            store.auth_subscription("imsi-001010000000002"),
            Err(DbiError::SubscriberNotFound(_))
        ));
    }

    #[test]
    fn test_memory_dbi_update_sqn() {
        let store = MemoryDbi::new();
        assert!(store.is_empty());
        store.insert(subscription("imsi-001010000000001"));

        store.update_sqn("imsi-001010000000001", "00000000002a").unwrap();
        let sub = store.auth_subscription("imsi-001010000000001").unwrap();
        assert_eq!(sub.sequence_number, "00000000002A");

        assert!(matches!(
            store.update_sqn("imsi-001010000000002", "000000000001"),
            Err(DbiError::SubscriberNotFound(_))
        ));
        assert!(matches!(
            store.update_sqn("imsi-001010000000001", "12345"),
            Err(DbiError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_security_opc() {
        let document = doc! {
            "imsi": "001010000000001",
            "security": {
                "k": "465B5CE8B199B49FAA5F0A2EE238A6BC",
                "opc": "CD63CB71954A9F4E48A5994E37A02BAF",
                "amf": "8000",
                "sqn": 33_i64,
            }
        };
        let sub = parse_security("imsi-001010000000001", &document).unwrap();
        assert_eq!(sub.operator_key_type, OperatorKeyType::Opc);
        assert_eq!(sub.sequence_number, "000000000021");
        assert_eq!(sub.authentication_management_field, "8000");
        assert_eq!(sub.authentication_method, "5G_AKA");
    }

    #[test]
    fn test_parse_security_op() {
        let document = doc! {
            "imsi": "001010000000001",
            "security": {
                "k": "465B5CE8B199B49FAA5F0A2EE238A6BC",
                "op": "CDC202D5123E20F62B6D676AC72CB318",
                "amf": "8000",
                "sqn": 1_i32,
            }
        };
        let sub = parse_security("imsi-001010000000001", &document).unwrap();
        assert_eq!(sub.operator_key_type, OperatorKeyType::Op);
        assert_eq!(sub.operator_key, "CDC202D5123E20F62B6D676AC72CB318");
        assert_eq!(sub.sequence_number, "000000000001");
    }

    #[test]
    fn test_parse_security_missing() {
        let document = doc! { "imsi": "001010000000001" };
        assert!(matches!(
            parse_security("imsi-001010000000001", &document),
            Err(DbiError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_supi_query() {
        let query = supi_query("imsi-001010000000001").unwrap();
        assert_eq!(query.get_str("imsi").unwrap(), "001010000000001");
        assert!(matches!(supi_query("001010000000001"), Err(DbiError::InvalidSupi(_))));
    }
}
