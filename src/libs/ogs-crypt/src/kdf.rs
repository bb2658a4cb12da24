//! Key Derivation Functions
//!
//! Implements the generic KDF of 3GPP TS 33.220 clause B.2 and the
//! derivations built on it by:
//! - 3GPP TS 33.501 Annex A (Kausf, RES*/XRES*, Kseaf, HXRES*)
//! - 3GPP TS 33.402 Annex A.2 (CK'/IK')
//! - 3GPP TS 33.401 Annex A.2 (Kasme)
//!
//! Every derivation keyed by CK and IK uses the concatenation CK || IK.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::milenage::{OGS_KEY_LEN, OGS_RAND_LEN, OGS_SQN_LEN};

// Length constants
pub const OGS_SHA256_DIGEST_SIZE: usize = 32;
pub const OGS_KAUSF_LEN: usize = 32;
pub const OGS_KSEAF_LEN: usize = 32;
pub const OGS_KASME_LEN: usize = 32;
pub const OGS_XRES_STAR_LEN: usize = 16;
pub const OGS_HXRES_STAR_LEN: usize = 16;
pub const OGS_SQN_XOR_AK_LEN: usize = OGS_SQN_LEN;
pub const OGS_PLMN_ID_LEN: usize = 3;

// FC (Function Code) values for KDF
pub const FC_FOR_KASME: u8 = 0x10;
pub const FC_FOR_CK_PRIME_IK_PRIME_DERIVATION: u8 = 0x20;
pub const FC_FOR_KAUSF_DERIVATION: u8 = 0x6A;
pub const FC_FOR_RES_STAR_XRES_STAR_DERIVATION: u8 = 0x6B;
pub const FC_FOR_KSEAF_DERIVATION: u8 = 0x6C;

type HmacSha256 = Hmac<Sha256>;

/// Error type for KDF operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum KdfError {
    /// Parameter whose length does not fit the 2-octet Li field
    #[error("KDF parameter P{index} too long ({len} octets)")]
    ParameterTooLong { index: usize, len: usize },
}

/// Largest parameter length encodable in Li
pub const OGS_KDF_MAX_PARAM_LEN: usize = u16::MAX as usize;

/// Build the KDF input string S = FC || P0 || L0 || P1 || L1 ...
///
/// Each Li is the length of Pi in octets as a 2-octet big-endian value.
pub fn ogs_kdf_input(fc: u8, params: &[&[u8]]) -> Result<Vec<u8>, KdfError> {
    let total_len = 1 + params.iter().map(|p| p.len() + 2).sum::<usize>();

    let mut s = Vec::with_capacity(total_len);
    s.push(fc);
    for (index, param) in params.iter().enumerate() {
        let len = u16::try_from(param.len()).map_err(|_| KdfError::ParameterTooLong {
            index,
            len: param.len(),
        })?;
        s.extend_from_slice(param);
        s.extend_from_slice(&len.to_be_bytes());
    }
    Ok(s)
}

/// Common KDF function as defined in TS 33.220 clause B.2.0
///
/// `KDF(key, S) = HMAC-SHA-256(key, S)`
pub fn ogs_kdf_common(
    key: &[u8],
    fc: u8,
    params: &[&[u8]],
) -> Result<[u8; OGS_SHA256_DIGEST_SIZE], KdfError> {
    let s = ogs_kdf_input(fc, params)?;

    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(&s);

    let mut output = [0u8; OGS_SHA256_DIGEST_SIZE];
    output.copy_from_slice(&mac.finalize().into_bytes());
    Ok(output)
}

fn ck_ik_key(ck: &[u8; OGS_KEY_LEN], ik: &[u8; OGS_KEY_LEN]) -> [u8; OGS_KEY_LEN * 2] {
    let mut key = [0u8; OGS_KEY_LEN * 2];
    key[..OGS_KEY_LEN].copy_from_slice(ck);
    key[OGS_KEY_LEN..].copy_from_slice(ik);
    key
}

/// TS33.501 Annex A.2: Kausf derivation function
///
/// P0 = serving network name, P1 = SQN ^ AK.
pub fn ogs_kdf_kausf(
    ck: &[u8; OGS_KEY_LEN],
    ik: &[u8; OGS_KEY_LEN],
    serving_network_name: &str,
    sqn_xor_ak: &[u8; OGS_SQN_XOR_AK_LEN],
) -> Result<[u8; OGS_KAUSF_LEN], KdfError> {
    ogs_kdf_common(
        &ck_ik_key(ck, ik),
        FC_FOR_KAUSF_DERIVATION,
        &[serving_network_name.as_bytes(), sqn_xor_ak],
    )
}

/// TS33.501 Annex A.4: RES* and XRES* derivation function
///
/// P0 = serving network name, P1 = RAND, P2 = RES. The result is the
/// 128 least significant bits of the KDF output.
pub fn ogs_kdf_xres_star(
    ck: &[u8; OGS_KEY_LEN],
    ik: &[u8; OGS_KEY_LEN],
    serving_network_name: &str,
    rand: &[u8; OGS_RAND_LEN],
    xres: &[u8],
) -> Result<[u8; OGS_XRES_STAR_LEN], KdfError> {
    let output = ogs_kdf_common(
        &ck_ik_key(ck, ik),
        FC_FOR_RES_STAR_XRES_STAR_DERIVATION,
        &[serving_network_name.as_bytes(), rand, xres],
    )?;

    let mut xres_star = [0u8; OGS_XRES_STAR_LEN];
    xres_star.copy_from_slice(&output[OGS_SHA256_DIGEST_SIZE - OGS_XRES_STAR_LEN..]);
    Ok(xres_star)
}

/// TS33.501 Annex A.5: HRES* and HXRES* derivation function
///
/// SHA-256(RAND || XRES*), 128 least significant bits.
pub fn ogs_kdf_hxres_star(
    rand: &[u8; OGS_RAND_LEN],
    xres_star: &[u8; OGS_XRES_STAR_LEN],
) -> [u8; OGS_HXRES_STAR_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(rand);
    hasher.update(xres_star);
    let digest = hasher.finalize();

    let mut hxres_star = [0u8; OGS_HXRES_STAR_LEN];
    hxres_star.copy_from_slice(&digest[OGS_SHA256_DIGEST_SIZE - OGS_HXRES_STAR_LEN..]);
    hxres_star
}

/// TS33.501 Annex A.6: Kseaf derivation function
pub fn ogs_kdf_kseaf(
    serving_network_name: &str,
    kausf: &[u8; OGS_KAUSF_LEN],
) -> Result<[u8; OGS_KSEAF_LEN], KdfError> {
    ogs_kdf_common(
        kausf,
        FC_FOR_KSEAF_DERIVATION,
        &[serving_network_name.as_bytes()],
    )
}

/// TS33.402 Annex A.2: CK' and IK' derivation function
///
/// P0 = access network identity, P1 = SQN ^ AK. CK' is the first half
/// of the output and IK' the second.
pub fn ogs_kdf_ck_ik_prime(
    ck: &[u8; OGS_KEY_LEN],
    ik: &[u8; OGS_KEY_LEN],
    access_network_identity: &str,
    sqn_xor_ak: &[u8; OGS_SQN_XOR_AK_LEN],
) -> Result<([u8; OGS_KEY_LEN], [u8; OGS_KEY_LEN]), KdfError> {
    let output = ogs_kdf_common(
        &ck_ik_key(ck, ik),
        FC_FOR_CK_PRIME_IK_PRIME_DERIVATION,
        &[access_network_identity.as_bytes(), sqn_xor_ak],
    )?;

    let mut ck_prime = [0u8; OGS_KEY_LEN];
    let mut ik_prime = [0u8; OGS_KEY_LEN];
    ck_prime.copy_from_slice(&output[..OGS_KEY_LEN]);
    ik_prime.copy_from_slice(&output[OGS_KEY_LEN..]);
    Ok((ck_prime, ik_prime))
}

/// TS33.401 Annex A.2: KASME derivation function
///
/// P0 = serving network identity (PLMN-ID), P1 = SQN ^ AK.
pub fn ogs_auc_kasme(
    ck: &[u8; OGS_KEY_LEN],
    ik: &[u8; OGS_KEY_LEN],
    plmn_id: &[u8; OGS_PLMN_ID_LEN],
    sqn: &[u8; OGS_SQN_LEN],
    ak: &[u8; OGS_SQN_LEN],
) -> Result<[u8; OGS_KASME_LEN], KdfError> {
    let mut sqn_xor_ak = [0u8; OGS_SQN_XOR_AK_LEN];
    for i in 0..OGS_SQN_XOR_AK_LEN {
        sqn_xor_ak[i] = sqn[i] ^ ak[i];
    }

    ogs_kdf_common(&ck_ik_key(ck, ik), FC_FOR_KASME, &[plmn_id, &sqn_xor_ak])
}

#[cfg(test)]
mod tests {
    use super::*;

    const CK: [u8; 16] = [0x11; 16];
    const IK: [u8; 16] = [0x22; 16];
    const SNN: &str = "5G:mnc001.mcc001.3gppnetwork.org";

    fn hmac(key: &[u8], data: &[u8]) -> [u8; 32] {
        let mut mac = HmacSha256::new_from_slice(key).unwrap();
        mac.update(data);
        let mut out = [0u8; 32];
        out.copy_from_slice(&mac.finalize().into_bytes());
        out
    }

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    #[test]
    fn test_kdf_input_encoding() {
        let s = ogs_kdf_input(0x6A, &[b"abc", &[0x01, 0x02]]).unwrap();
        assert_eq!(s, vec![0x6A, b'a', b'b', b'c', 0x00, 0x03, 0x01, 0x02, 0x00, 0x02]);
    }

    #[test]
    fn test_kdf_input_length_limit() {
        let max = vec![0u8; OGS_KDF_MAX_PARAM_LEN];
        let s = ogs_kdf_input(0x6A, &[&max]).unwrap();
        assert_eq!(&s[s.len() - 2..], &[0xFF, 0xFF]);

        let too_long = vec![0u8; OGS_KDF_MAX_PARAM_LEN + 1];
        assert_eq!(
            ogs_kdf_input(0x6A, &[b"ok", &too_long]),
            Err(KdfError::ParameterTooLong { index: 1, len: 65536 })
        );

        let snn = "x".repeat(65539);
        assert!(ogs_kdf_kausf(&CK, &IK, &snn, &[0u8; 6]).is_err());
        assert!(ogs_kdf_xres_star(&CK, &IK, &snn, &[0u8; 16], &[0u8; 8]).is_err());
    }

    // CK, IK, RES, RAND and SQN ^ AK of TS 35.208 test set 1; Kausf and
    // XRES* computed independently with Python hmac/hashlib
    #[test]
    fn test_kdf_known_answer_test_set_1() {
        let ck: [u8; 16] = hex("B40BA9A3C58B2A05BBF0D987B21BF8CB").try_into().unwrap();
        let ik: [u8; 16] = hex("F769BCD751044604127672711C6D3441").try_into().unwrap();
        let rand: [u8; 16] = hex("23553CBE9637A89D218AE64DAE47BF35").try_into().unwrap();
        let res = hex("A54211D5E3BA50BF");
        let sqn_xor_ak: [u8; 6] = hex("55F328B43577").try_into().unwrap();

        assert_eq!(
            ogs_kdf_kausf(&ck, &ik, SNN, &sqn_xor_ak).unwrap().to_vec(),
            hex("474698CAF02CC715DB2EC0726510CFEE6CAA5BB1A649CB01224F2E23AF94DE1B")
        );
        assert_eq!(
            ogs_kdf_xres_star(&ck, &ik, SNN, &rand, &res).unwrap().to_vec(),
            hex("F236A7417272BFB2D66D4D670733B527")
        );
    }

    #[test]
    fn test_kdf_kausf() {
        let sqn_xor_ak = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let kausf = ogs_kdf_kausf(&CK, &IK, SNN, &sqn_xor_ak).unwrap();

        let mut key = Vec::new();
        key.extend_from_slice(&CK);
        key.extend_from_slice(&IK);
        let mut s = vec![0x6A];
        s.extend_from_slice(SNN.as_bytes());
        s.extend_from_slice(&(SNN.len() as u16).to_be_bytes());
        s.extend_from_slice(&sqn_xor_ak);
        s.extend_from_slice(&[0x00, 0x06]);

        assert_eq!(kausf, hmac(&key, &s));
    }

    #[test]
    fn test_kdf_kausf_key_order() {
        let sqn_xor_ak = [0u8; 6];
        assert_ne!(
            ogs_kdf_kausf(&CK, &IK, SNN, &sqn_xor_ak).unwrap(),
            ogs_kdf_kausf(&IK, &CK, SNN, &sqn_xor_ak).unwrap()
        );
    }

    #[test]
    fn test_kdf_xres_star_is_low_half() {
        let rand = [0x33; 16];
        let res = [0x44; 8];
        let xres_star = ogs_kdf_xres_star(&CK, &IK, SNN, &rand, &res).unwrap();
        let full = ogs_kdf_common(
            &ck_ik_key(&CK, &IK),
            FC_FOR_RES_STAR_XRES_STAR_DERIVATION,
            &[SNN.as_bytes(), &rand, &res],
        )
        .unwrap();
        assert_eq!(&xres_star[..], &full[16..]);
    }

    #[test]
    fn test_kdf_bound_to_serving_network() {
        let rand = [0x33; 16];
        let res = [0x44; 8];
        let other = "5G:mnc002.mcc001.3gppnetwork.org";
        let sqn_xor_ak = [0x0a; 6];

        assert_ne!(
            ogs_kdf_xres_star(&CK, &IK, SNN, &rand, &res).unwrap(),
            ogs_kdf_xres_star(&CK, &IK, other, &rand, &res).unwrap()
        );
        assert_ne!(
            ogs_kdf_kausf(&CK, &IK, SNN, &sqn_xor_ak).unwrap(),
            ogs_kdf_kausf(&CK, &IK, other, &sqn_xor_ak).unwrap()
        );
    }

    #[test]
    fn test_kdf_ck_ik_prime_split() {
        let sqn_xor_ak = [0x0b; 6];
        let (ck_prime, ik_prime) = ogs_kdf_ck_ik_prime(&CK, &IK, "WLAN", &sqn_xor_ak).unwrap();
        let full = ogs_kdf_common(
            &ck_ik_key(&CK, &IK),
            FC_FOR_CK_PRIME_IK_PRIME_DERIVATION,
            &[b"WLAN", &sqn_xor_ak],
        )
        .unwrap();
        assert_eq!(&ck_prime[..], &full[..16]);
        assert_eq!(&ik_prime[..], &full[16..]);
    }

    #[test]
    fn test_kdf_function_codes_differ() {
        // Same parameters under FC 0x6A and FC 0x20 must not collide
        let sqn_xor_ak = [0x0c; 6];
        let kausf = ogs_kdf_kausf(&CK, &IK, SNN, &sqn_xor_ak).unwrap();
        let (ck_prime, ik_prime) = ogs_kdf_ck_ik_prime(&CK, &IK, SNN, &sqn_xor_ak).unwrap();
        assert_ne!(&kausf[..16], &ck_prime[..]);
        assert_ne!(&kausf[16..], &ik_prime[..]);
    }

    #[test]
    fn test_auc_kasme() {
        let plmn_id = [0x00, 0xf1, 0x10];
        let sqn = [0xff; 6];
        let ak = [0x0f; 6];
        let kasme = ogs_auc_kasme(&CK, &IK, &plmn_id, &sqn, &ak).unwrap();

        let mut s = vec![0x10, 0x00, 0xf1, 0x10, 0x00, 0x03];
        s.extend_from_slice(&[0xf0; 6]);
        s.extend_from_slice(&[0x00, 0x06]);
        assert_eq!(kasme, hmac(&ck_ik_key(&CK, &IK), &s));
    }

    #[test]
    fn test_kdf_kseaf_and_hxres_star() {
        let kausf = [0x55; 32];
        let kseaf = ogs_kdf_kseaf(SNN, &kausf).unwrap();
        let mut s = vec![0x6C];
        s.extend_from_slice(SNN.as_bytes());
        s.extend_from_slice(&(SNN.len() as u16).to_be_bytes());
        assert_eq!(kseaf, hmac(&kausf, &s));

        let rand = [0x01; 16];
        let xres_star = [0x02; 16];
        let digest = Sha256::new()
            .chain_update(rand)
            .chain_update(xres_star)
            .finalize();
        assert_eq!(&ogs_kdf_hxres_star(&rand, &xres_star)[..], &digest[16..]);
    }
}
