//! UE Authentication (Nudm-ueau) Vector Engine
//!
//! Builds 5G HE AKA authentication vectors from a subscriber's long-term
//! credentials and validates resynchronization tokens (AUTS).
//!
//! Vector assembly is a pure function of (K, OPc, SQN, AMF, serving network
//! name, RAND). SQN bookkeeping belongs to the caller, see
//! [`crate::nudm_handler`].

use ogs_core::{ogs_hex_to_array, ogs_hex_to_string_upper};
use ogs_crypt::kdf::{self, KdfError};
use ogs_crypt::milenage::{
    Milenage, MilenageError, OGS_AMF_LEN, OGS_KEY_LEN, OGS_RAND_LEN, OGS_SQN_LEN,
};
use ogs_dbi::{AuthenticationSubscription, OperatorKeyType, OGS_AUTH_METHOD_5G_AKA};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{UdmError, UdmResult};
use crate::sqn::{sqn_from_buffer, sqn_from_hex, sqn_to_buffer};

/// Authentication vector type returned for 5G AKA
pub const AV_TYPE_5G_HE_AKA: &str = "5G_HE_AKA";

/// Subscriber long-term key K and operator key OPc
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SubscriberKeys {
    k: [u8; OGS_KEY_LEN],
    opc: [u8; OGS_KEY_LEN],
}

impl SubscriberKeys {
    pub fn new(k: [u8; OGS_KEY_LEN], opc: [u8; OGS_KEY_LEN]) -> Self {
        Self { k, opc }
    }

    /// Keys for a subscriber provisioned with OP rather than OPc
    pub fn from_op(k: [u8; OGS_KEY_LEN], op: &[u8; OGS_KEY_LEN]) -> Self {
        let opc = *Milenage::with_op(&k, op).opc();
        Self { k, opc }
    }

    pub fn opc(&self) -> &[u8; OGS_KEY_LEN] {
        &self.opc
    }

    fn milenage(&self) -> Milenage {
        Milenage::new(&self.k, &self.opc)
    }
}

impl std::fmt::Debug for SubscriberKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SubscriberKeys { .. }")
    }
}

/// Validated credentials of one subscriber
#[derive(Debug, Clone)]
pub struct AuthCredentials {
    pub keys: SubscriberKeys,
    pub sqn: u64,
    pub amf: [u8; OGS_AMF_LEN],
}

fn required<'a>(value: &'a str, name: &str) -> UdmResult<&'a str> {
    if value.is_empty() {
        return Err(UdmError::IncompleteCredentials(format!("No {}", name)));
    }
    Ok(value)
}

fn parse_key(value: &str, name: &str) -> UdmResult<[u8; OGS_KEY_LEN]> {
    ogs_hex_to_array::<OGS_KEY_LEN>(required(value, name)?)
        .map_err(|e| UdmError::IncompleteCredentials(format!("Invalid {}: {}", name, e)))
}

impl AuthCredentials {
    /// Validate a stored authentication subscription
    ///
    /// Only 5G AKA subscriptions are accepted. An OP-type operator key is
    /// turned into OPc here.
    pub fn from_subscription(sub: &AuthenticationSubscription) -> UdmResult<Self> {
        if sub.authentication_method != OGS_AUTH_METHOD_5G_AKA {
            return Err(UdmError::UnsupportedAuthMethod(sub.authentication_method.clone()));
        }

        let mut k = parse_key(&sub.permanent_key, "permanentKey")?;
        let mut operator_key = parse_key(&sub.operator_key, "operatorKey")?;
        let keys = match sub.operator_key_type {
            OperatorKeyType::Opc => SubscriberKeys::new(k, operator_key),
            OperatorKeyType::Op => SubscriberKeys::from_op(k, &operator_key),
        };
        k.zeroize();
        operator_key.zeroize();

        let sqn = sqn_from_hex(required(&sub.sequence_number, "sequenceNumber")?)?;

        let amf = ogs_hex_to_array::<OGS_AMF_LEN>(required(
            &sub.authentication_management_field,
            "authenticationManagementField",
        )?)
        .map_err(|e| {
            UdmError::IncompleteCredentials(format!("Invalid authenticationManagementField: {}", e))
        })?;

        Ok(Self { keys, sqn, amf })
    }
}

/// 5G HE AKA authentication vector (TS 29.503 AvEapAkaPrime/Av5GHeAka)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationVector {
    pub av_type: String,
    pub rand: String,
    pub xres_star: String,
    pub autn: String,
    pub kausf: String,
}

/// Assemble a vector for a given RAND
///
/// 1. Milenage with (K, OPc, RAND, SQN, AMF)
/// 2. AUTN = SQN ^ AK || AMF || MAC-A
/// 3. Kausf per TS 33.501 A.2
/// 4. XRES* per TS 33.501 A.4
pub fn generate_vector_with_rand(
    keys: &SubscriberKeys,
    sqn: u64,
    amf: &[u8; OGS_AMF_LEN],
    serving_network_name: &str,
    rand: &[u8; OGS_RAND_LEN],
) -> UdmResult<AuthenticationVector> {
    let sqn = sqn_to_buffer(sqn);
    let out = keys.milenage().generate(rand, &sqn, amf);

    let kausf = kdf::ogs_kdf_kausf(&out.ck, &out.ik, serving_network_name, &out.sqn_xor_ak())
        .map_err(invalid_serving_network_name)?;
    let xres_star =
        kdf::ogs_kdf_xres_star(&out.ck, &out.ik, serving_network_name, rand, &out.res)
            .map_err(invalid_serving_network_name)?;

    Ok(AuthenticationVector {
        av_type: AV_TYPE_5G_HE_AKA.to_string(),
        rand: ogs_hex_to_string_upper(rand),
        xres_star: ogs_hex_to_string_upper(&xres_star),
        autn: ogs_hex_to_string_upper(&out.autn),
        kausf: ogs_hex_to_string_upper(&kausf),
    })
}

fn invalid_serving_network_name(e: KdfError) -> UdmError {
    UdmError::InvalidInput(format!("Invalid servingNetworkName: {}", e))
}

/// Assemble a vector with a fresh RAND from the OS CSPRNG
pub fn generate_vector(
    keys: &SubscriberKeys,
    sqn: u64,
    amf: &[u8; OGS_AMF_LEN],
    serving_network_name: &str,
) -> UdmResult<AuthenticationVector> {
    let rand = ogs_core::rand::ogs_random_array::<OGS_RAND_LEN>();
    generate_vector_with_rand(keys, sqn, amf, serving_network_name, &rand)
}

/// Validate AUTS and recover the UE's SQN (SQN_MS)
///
/// `rand` is the RAND of the vector the UE rejected.
pub fn process_auts(keys: &SubscriberKeys, rand: &[u8; OGS_RAND_LEN], auts: &[u8]) -> UdmResult<u64> {
    match keys.milenage().sqn_ms_from_auts(rand, auts) {
        Ok(sqn_ms) => Ok(sqn_from_buffer(&sqn_ms)),
        Err(MilenageError::InvalidLength { actual, .. }) => {
            Err(UdmError::InvalidInput(format!("Invalid AUTS length [{}]", actual)))
        }
        Err(MilenageError::MacMismatch) => Err(UdmError::SyncFailure),
    }
}

/// UE-side AUTS for a given SQN_MS
pub fn build_auts(keys: &SubscriberKeys, rand: &[u8; OGS_RAND_LEN], sqn_ms: u64) -> [u8; 14] {
    let sqn_ms: [u8; OGS_SQN_LEN] = sqn_to_buffer(sqn_ms);
    keys.milenage().auts(rand, &sqn_ms)
}
