//! Property-Based Tests for the UDM vector engine
//!
//! SQN arithmetic, vector assembly and the resynchronization path checked
//! over arbitrary subscriber keys and sequence numbers.

use proptest::prelude::*;

use crate::sqn::*;
use crate::ueau::*;

const SNN: &str = "5G:mnc001.mcc001.3gppnetwork.org";

fn keys_strategy() -> impl Strategy<Value = SubscriberKeys> {
    (
        prop::array::uniform16(any::<u8>()),
        prop::array::uniform16(any::<u8>()),
    )
        .prop_map(|(k, opc)| SubscriberKeys::new(k, opc))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Issued SQN never repeats and stays within 48 bits
    #[test]
    fn prop_next_sqn_in_range(sqn in 0..=OGS_MAX_SQN) {
        let next = next_sqn(sqn);
        prop_assert!(next <= OGS_MAX_SQN);
        if sqn < OGS_MAX_SQN {
            prop_assert_eq!(next, sqn + 1);
        } else {
            prop_assert_eq!(next, 0);
        }
    }

    // Stored representation is 12 uppercase hex digits and parses back
    #[test]
    fn prop_sqn_hex(sqn in 0..=OGS_MAX_SQN) {
        let hex = sqn_to_hex(sqn);
        prop_assert_eq!(hex.len(), 12);
        prop_assert_eq!(hex.to_uppercase(), hex.clone());
        prop_assert_eq!(sqn_from_hex(&hex).unwrap(), sqn);
    }

    // Same inputs, same vector; a different SQN changes AUTN
    #[test]
    fn prop_vector_deterministic(
        keys in keys_strategy(),
        sqn in 0..OGS_MAX_SQN,
        amf in prop::array::uniform2(any::<u8>()),
        rand in prop::array::uniform16(any::<u8>()),
    ) {
        let a = generate_vector_with_rand(&keys, sqn, &amf, SNN, &rand).unwrap();
        let b = generate_vector_with_rand(&keys, sqn, &amf, SNN, &rand).unwrap();
        prop_assert_eq!(&a, &b);

        let c = generate_vector_with_rand(&keys, sqn + 1, &amf, SNN, &rand).unwrap();
        prop_assert_ne!(a.autn, c.autn);
    }

    // process_auts recovers exactly the SQN the UE reported
    #[test]
    fn prop_auts_recovers_sqn_ms(
        keys in keys_strategy(),
        rand in prop::array::uniform16(any::<u8>()),
        sqn_ms in 0..=OGS_MAX_SQN,
    ) {
        let auts = build_auts(&keys, &rand, sqn_ms);
        prop_assert_eq!(process_auts(&keys, &rand, &auts).unwrap(), sqn_ms);
    }

    // AUTS built under other keys is a sync failure
    #[test]
    fn prop_auts_wrong_keys(
        keys in keys_strategy(),
        other in keys_strategy(),
        rand in prop::array::uniform16(any::<u8>()),
        sqn_ms in 0..=OGS_MAX_SQN,
    ) {
        prop_assume!(keys != other);
        let auts = build_auts(&other, &rand, sqn_ms);
        prop_assert!(matches!(
            process_auts(&keys, &rand, &auts),
            Err(crate::error::UdmError::SyncFailure)
        ));
    }
}
