//! Property-Based Tests for Database Interface
//!
//! Sequence numbers written through the store come back unchanged.

use proptest::prelude::*;

use crate::subscription::{AuthSubscriptionStore, MemoryDbi};
use crate::types::*;

// Strategy for generating valid IMSI strings (15 digits)
fn imsi_strategy() -> impl Strategy<Value = String> {
    "[0-9]{15}".prop_map(|s| format!("imsi-{}", s))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_memory_sqn_round_trip(supi in imsi_strategy(), sqn in 0u64..=OGS_MAX_SQN) {
        let store = MemoryDbi::new();
        store.insert(AuthenticationSubscription {
            supi: supi.clone(),
            permanent_key: String::new(),
            operator_key: String::new(),
            operator_key_type: OperatorKeyType::Opc,
            sequence_number: "000000000000".to_string(),
            authentication_management_field: String::new(),
            authentication_method: OGS_AUTH_METHOD_5G_AKA.to_string(),
        });

        let hex = format!("{:012X}", sqn);
        store.update_sqn(&supi, &hex).unwrap();
        prop_assert_eq!(store.auth_subscription(&supi).unwrap().sequence_number.clone(), hex);
    }

    #[test]
    fn prop_supi_split(digits in "[0-9]{15}") {
        let supi = format!("imsi-{}", digits);
        prop_assert_eq!(ogs_id_get_type(&supi), Some("imsi"));
        prop_assert_eq!(ogs_id_get_value(&supi), Some(digits.as_str()));
    }
}
