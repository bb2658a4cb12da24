//! NUDM Handler Functions
//!
//! Nudm-ueau generate-auth-data: request validation, subscriber lookup,
//! resynchronization and SQN bookkeeping around the vector engine.

use ogs_core::ogs_hex_from_string;
use ogs_core::ogs_hex_to_array;
use ogs_crypt::milenage::{OGS_AUTS_LEN, OGS_RAND_LEN};
use ogs_dbi::{ogs_id_get_type, ogs_id_get_value};
use serde::{Deserialize, Serialize};

use crate::context::UdmContext;
use crate::error::{UdmError, UdmResult};
use crate::sqn::{next_sqn, sqn_to_hex};
use crate::ueau::{self, AuthCredentials, AuthenticationVector};

/// Authentication type reported for every generated vector
pub const AUTH_TYPE_5G_AKA: &str = "5G_AKA";

/// Highest SUCI protection scheme defined by TS 33.501 (profile B)
pub const OGS_PROTECTION_SCHEME_PROFILE_B: u8 = 2;

/// Authentication info request data (TS 29.503 AuthenticationInfoRequest)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationInfoRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_network_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ausf_instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resynchronization_info: Option<ResynchronizationInfo>,
}

/// Resynchronization info for re-sync procedure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResynchronizationInfo {
    pub rand: String,
    pub auts: String,
}

/// Authentication info result (TS 29.503 AuthenticationInfoResult)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationInfoResult {
    pub auth_type: String,
    pub supi: String,
    pub authentication_vector: AuthenticationVector,
}

/// Check the identity in the request path
///
/// SUPIs are `imsi-<5..15 digits>` or `nai-<user@realm>`. A SUCI is
/// recognised but never de-concealed.
pub fn udm_check_supi(supi_or_suci: &str) -> UdmResult<()> {
    let (id_type, value) = match (ogs_id_get_type(supi_or_suci), ogs_id_get_value(supi_or_suci)) {
        (Some(t), Some(v)) => (t, v),
        _ => {
            return Err(UdmError::InvalidInput(format!(
                "Invalid SUPI [{}]",
                supi_or_suci
            )))
        }
    };

    match id_type {
        "imsi" if (5..=15).contains(&value.len()) && value.bytes().all(|c| c.is_ascii_digit()) => {
            Ok(())
        }
        "nai" if value.contains('@') => Ok(()),
        "suci" => {
            // suci-<type>-<mcc>-<mnc>-<routing>-<scheme>-<hnkey>-<output>
            let scheme = value.split('-').nth(4).and_then(|s| s.parse::<u8>().ok());
            match scheme {
                Some(scheme) if scheme > OGS_PROTECTION_SCHEME_PROFILE_B => Err(
                    UdmError::NotImplemented(format!("Protection scheme [{}]", scheme)),
                ),
                _ => Err(UdmError::NotImplemented("SUCI de-concealment".to_string())),
            }
        }
        _ => Err(UdmError::InvalidInput(format!("Invalid SUPI [{}]", supi_or_suci))),
    }
}

/// Check a serving network name (TS 24.501 9.12.1)
///
/// `5G:mnc<MNC>.mcc<MCC>.3gppnetwork.org`, optionally followed by
/// `:<NID>` (11 hex digits) for an SNPN.
pub fn udm_check_serving_network_name(serving_network_name: &str) -> UdmResult<()> {
    fn digits(s: Option<&str>) -> Option<&str> {
        s.filter(|s| s.bytes().all(|c| c.is_ascii_digit()))
    }

    fn parse(snn: &str) -> Option<()> {
        let rest = snn.strip_prefix("5G:mnc")?;
        digits(rest.get(..3))?;
        let rest = rest.get(3..)?.strip_prefix(".mcc")?;
        digits(rest.get(..3))?;
        let nid = rest.get(3..)?.strip_prefix(".3gppnetwork.org")?;
        match nid.strip_prefix(':') {
            None if nid.is_empty() => Some(()),
            Some(nid) if nid.len() == 11 && nid.bytes().all(|c| c.is_ascii_hexdigit()) => Some(()),
            _ => None,
        }
    }

    parse(serving_network_name).ok_or_else(|| {
        UdmError::InvalidInput(format!(
            "Invalid servingNetworkName (length {})",
            serving_network_name.len()
        ))
    })
}

fn required_ie<'a>(supi: &str, value: &'a Option<String>, name: &str) -> UdmResult<&'a str> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => {
            log::error!("[{}] No {}", supi, name);
            Err(UdmError::InvalidInput(format!("No {}", name)))
        }
    }
}

/// Decoded resynchronization info
struct ResyncInput {
    rand: [u8; OGS_RAND_LEN],
    auts: Vec<u8>,
}

fn decode_resync_info(supi: &str, info: &ResynchronizationInfo) -> UdmResult<ResyncInput> {
    let rand = ogs_hex_to_array::<OGS_RAND_LEN>(&info.rand).map_err(|e| {
        log::error!("[{}] Invalid RAND: {}", supi, e);
        UdmError::InvalidInput(format!("Invalid RAND: {}", e))
    })?;
    let auts = ogs_hex_from_string(&info.auts).map_err(|e| {
        log::error!("[{}] Invalid AUTS: {}", supi, e);
        UdmError::InvalidInput(format!("Invalid AUTS: {}", e))
    })?;
    if auts.len() != OGS_AUTS_LEN {
        log::error!("[{}] Invalid AUTS length [{}]", supi, auts.len());
        return Err(UdmError::InvalidInput(format!(
            "Invalid AUTS length [{}]",
            auts.len()
        )));
    }
    Ok(ResyncInput { rand, auts })
}

/// Handle NUDM UEAU get request (security-information/generate-auth-data)
///
/// Input is validated before the subscriber is touched. Under the
/// subscriber's SQN register the record is read, an optional resync
/// adopts the UE's SQN, the vector is computed and only then is the next
/// SQN committed.
pub fn udm_nudm_ueau_handle_get(
    ctx: &UdmContext,
    supi_or_suci: &str,
    request: &AuthenticationInfoRequest,
) -> UdmResult<AuthenticationInfoResult> {
    udm_check_supi(supi_or_suci)?;
    let supi = supi_or_suci;

    log::debug!("[{}] Handle NUDM UEAU get request", supi);

    let serving_network_name =
        required_ie(supi, &request.serving_network_name, "servingNetworkName")?;
    let _ausf_instance_id = required_ie(supi, &request.ausf_instance_id, "ausfInstanceId")?;
    udm_check_serving_network_name(serving_network_name)
        .inspect_err(|e| log::error!("[{}] {}", supi, e))?;

    let resync = request
        .resynchronization_info
        .as_ref()
        .map(|info| decode_resync_info(supi, info))
        .transpose()?;

    ctx.sqn_authority().with_register(supi, || -> UdmResult<AuthenticationInfoResult> {
        let subscription = ctx.store().auth_subscription(supi)?;
        let creds = AuthCredentials::from_subscription(&subscription)?;

        // The register holds the next SQN to issue. After a resync the UE
        // only accepts SQN > SQN_MS, so issuance restarts at SQN_MS + 1.
        let mut sqn = creds.sqn;
        if let Some(resync) = &resync {
            let sqn_ms = ueau::process_auts(&creds.keys, &resync.rand, &resync.auts)
                .inspect_err(|e| log::warn!("[{}] {}", supi, e))?;
            log::info!(
                "[{}] Re-synchronization SQN [{}] -> [{}]",
                supi,
                sqn_to_hex(sqn),
                sqn_to_hex(sqn_ms)
            );
            sqn = next_sqn(sqn_ms);
        }

        let vector = ueau::generate_vector(&creds.keys, sqn, &creds.amf, serving_network_name)?;

        ctx.store().update_sqn(supi, &sqn_to_hex(next_sqn(sqn)))?;
        log::debug!("[{}] Vector issued with SQN [{}]", supi, sqn_to_hex(sqn));

        Ok(AuthenticationInfoResult {
            auth_type: AUTH_TYPE_5G_AKA.to_string(),
            supi: supi.to_string(),
            authentication_vector: vector,
        })
    })
}
