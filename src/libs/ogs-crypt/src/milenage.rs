//! 3GPP Milenage Algorithm
//!
//! Implements the Milenage algorithm set as defined in 3GPP TS 35.205,
//! TS 35.206 and TS 35.207, with conformance checked against the test
//! sets of TS 35.208.
//!
//! The kernel function is AES-128. Every output block is computed as
//!
//! ```text
//! TEMP = E_K(RAND ^ OPc)
//! OUT1 = E_K(TEMP ^ rot(IN1 ^ OPc, r1) ^ c1) ^ OPc
//! OUTn = E_K(rot(TEMP ^ OPc, rn) ^ cn) ^ OPc     n = 2..5
//! ```
//!
//! with IN1 = SQN || AMF || SQN || AMF.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::aes::AesEncContext;

// Length constants
pub const OGS_KEY_LEN: usize = 16;
pub const OGS_RAND_LEN: usize = 16;
pub const OGS_AUTN_LEN: usize = 16;
pub const OGS_AUTS_LEN: usize = 14;
pub const OGS_RES_LEN: usize = 8;
pub const OGS_AK_LEN: usize = 6;
pub const OGS_SQN_LEN: usize = 6;
pub const OGS_AMF_LEN: usize = 2;
pub const OGS_MAC_LEN: usize = 8;

/// AMF used for MAC-S on the resynchronization path (TS 33.102 6.3.3)
pub const OGS_RESYNC_AMF: [u8; OGS_AMF_LEN] = [0x00, 0x00];

// Rotation amounts in bits (TS 35.206 4.1)
const R1: u32 = 64;
const R2: u32 = 0;
const R3: u32 = 32;
const R4: u32 = 64;
const R5: u32 = 96;

// Constants c1..c5, only the last byte is non-zero
const C1: u8 = 0x00;
const C2: u8 = 0x01;
const C3: u8 = 0x02;
const C4: u8 = 0x04;
const C5: u8 = 0x08;

/// Error type for Milenage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MilenageError {
    /// Buffer of the wrong size handed to a variable-length entry point
    #[error("invalid {what} length: expected {expected}, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// MAC-S recomputed from AUTS does not match the received one
    #[error("MAC-S mismatch")]
    MacMismatch,
}

/// Outputs of f2, f3, f4, f5 and f5* for one RAND
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct F2345Output {
    pub res: [u8; OGS_RES_LEN],
    pub ck: [u8; OGS_KEY_LEN],
    pub ik: [u8; OGS_KEY_LEN],
    pub ak: [u8; OGS_AK_LEN],
    pub ak_star: [u8; OGS_AK_LEN],
}

impl std::fmt::Debug for F2345Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("F2345Output { .. }")
    }
}

/// Network-side authentication material for one challenge
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MilenageOutput {
    /// SQN ^ AK || AMF || MAC-A
    pub autn: [u8; OGS_AUTN_LEN],
    pub res: [u8; OGS_RES_LEN],
    pub ck: [u8; OGS_KEY_LEN],
    pub ik: [u8; OGS_KEY_LEN],
    pub ak: [u8; OGS_AK_LEN],
}

impl MilenageOutput {
    /// SQN ^ AK, the first six octets of AUTN
    pub fn sqn_xor_ak(&self) -> [u8; OGS_SQN_LEN] {
        let mut out = [0u8; OGS_SQN_LEN];
        out.copy_from_slice(&self.autn[..OGS_SQN_LEN]);
        out
    }
}

impl std::fmt::Debug for MilenageOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MilenageOutput")
            .field("autn", &self.autn)
            .finish_non_exhaustive()
    }
}

/// Milenage instance bound to one subscriber key and OPc
///
/// The AES key schedule for K is expanded once and reused for every
/// kernel invocation. OPc is wiped on drop.
#[derive(Clone)]
pub struct Milenage {
    cipher: AesEncContext,
    opc: Opc,
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct Opc([u8; OGS_KEY_LEN]);

impl Milenage {
    /// Create an instance from K and a precomputed OPc
    pub fn new(k: &[u8; OGS_KEY_LEN], opc: &[u8; OGS_KEY_LEN]) -> Self {
        Self {
            cipher: AesEncContext::new(k),
            opc: Opc(*opc),
        }
    }

    /// Create an instance from K and the operator variant OP
    pub fn with_op(k: &[u8; OGS_KEY_LEN], op: &[u8; OGS_KEY_LEN]) -> Self {
        let cipher = AesEncContext::new(k);
        let opc = derive_opc(&cipher, op);
        Self {
            cipher,
            opc: Opc(opc),
        }
    }

    /// OPc this instance was built with
    pub fn opc(&self) -> &[u8; OGS_KEY_LEN] {
        &self.opc.0
    }

    fn temp(&self, rand: &[u8; OGS_RAND_LEN]) -> [u8; 16] {
        self.cipher.encrypt_block(&xor16(rand, &self.opc.0))
    }

    fn out1(
        &self,
        rand: &[u8; OGS_RAND_LEN],
        sqn: &[u8; OGS_SQN_LEN],
        amf: &[u8; OGS_AMF_LEN],
    ) -> [u8; 16] {
        let temp = self.temp(rand);

        let mut in1 = [0u8; 16];
        in1[0..6].copy_from_slice(sqn);
        in1[6..8].copy_from_slice(amf);
        in1[8..14].copy_from_slice(sqn);
        in1[14..16].copy_from_slice(amf);

        let mut input = rotate(&xor16(&in1, &self.opc.0), R1);
        input[15] ^= C1;
        let input = xor16(&input, &temp);

        xor16(&self.cipher.encrypt_block(&input), &self.opc.0)
    }

    fn out_n(&self, temp: &[u8; 16], r: u32, c: u8) -> [u8; 16] {
        let mut input = rotate(&xor16(temp, &self.opc.0), r);
        input[15] ^= c;
        xor16(&self.cipher.encrypt_block(&input), &self.opc.0)
    }

    /// f1 and f1* in one pass: (MAC-A, MAC-S)
    pub fn f1_and_f1_star(
        &self,
        rand: &[u8; OGS_RAND_LEN],
        sqn: &[u8; OGS_SQN_LEN],
        amf: &[u8; OGS_AMF_LEN],
    ) -> ([u8; OGS_MAC_LEN], [u8; OGS_MAC_LEN]) {
        let out1 = self.out1(rand, sqn, amf);
        let mut mac_a = [0u8; OGS_MAC_LEN];
        let mut mac_s = [0u8; OGS_MAC_LEN];
        mac_a.copy_from_slice(&out1[0..8]);
        mac_s.copy_from_slice(&out1[8..16]);
        (mac_a, mac_s)
    }

    /// f1: network authentication code MAC-A
    pub fn f1(
        &self,
        rand: &[u8; OGS_RAND_LEN],
        sqn: &[u8; OGS_SQN_LEN],
        amf: &[u8; OGS_AMF_LEN],
    ) -> [u8; OGS_MAC_LEN] {
        self.f1_and_f1_star(rand, sqn, amf).0
    }

    /// f1*: resynchronization authentication code MAC-S
    pub fn f1_star(
        &self,
        rand: &[u8; OGS_RAND_LEN],
        sqn: &[u8; OGS_SQN_LEN],
        amf: &[u8; OGS_AMF_LEN],
    ) -> [u8; OGS_MAC_LEN] {
        self.f1_and_f1_star(rand, sqn, amf).1
    }

    /// f2 (RES), f3 (CK), f4 (IK), f5 (AK) and f5* (AK*)
    pub fn f2345(&self, rand: &[u8; OGS_RAND_LEN]) -> F2345Output {
        let temp = self.temp(rand);

        let out2 = self.out_n(&temp, R2, C2);
        let out3 = self.out_n(&temp, R3, C3);
        let out4 = self.out_n(&temp, R4, C4);
        let out5 = self.out_n(&temp, R5, C5);

        let mut output = F2345Output {
            res: [0; OGS_RES_LEN],
            ck: out3,
            ik: out4,
            ak: [0; OGS_AK_LEN],
            ak_star: [0; OGS_AK_LEN],
        };
        output.ak.copy_from_slice(&out2[0..6]);
        output.res.copy_from_slice(&out2[8..16]);
        output.ak_star.copy_from_slice(&out5[0..6]);
        output
    }

    /// f5*: anonymity key for resynchronization
    pub fn f5_star(&self, rand: &[u8; OGS_RAND_LEN]) -> [u8; OGS_AK_LEN] {
        let temp = self.temp(rand);
        let out5 = self.out_n(&temp, R5, C5);
        let mut ak_star = [0u8; OGS_AK_LEN];
        ak_star.copy_from_slice(&out5[0..6]);
        ak_star
    }

    /// Build AUTN and the session material for a challenge
    pub fn generate(
        &self,
        rand: &[u8; OGS_RAND_LEN],
        sqn: &[u8; OGS_SQN_LEN],
        amf: &[u8; OGS_AMF_LEN],
    ) -> MilenageOutput {
        let mac_a = self.f1(rand, sqn, amf);
        let f = self.f2345(rand);

        let mut autn = [0u8; OGS_AUTN_LEN];
        for i in 0..OGS_SQN_LEN {
            autn[i] = sqn[i] ^ f.ak[i];
        }
        autn[6..8].copy_from_slice(amf);
        autn[8..16].copy_from_slice(&mac_a);

        MilenageOutput {
            autn,
            res: f.res,
            ck: f.ck,
            ik: f.ik,
            ak: f.ak,
        }
    }

    /// UE side of resynchronization: AUTS = (SQN_MS ^ AK*) || MAC-S
    pub fn auts(
        &self,
        rand: &[u8; OGS_RAND_LEN],
        sqn_ms: &[u8; OGS_SQN_LEN],
    ) -> [u8; OGS_AUTS_LEN] {
        let ak_star = self.f5_star(rand);
        let mac_s = self.f1_star(rand, sqn_ms, &OGS_RESYNC_AMF);

        let mut auts = [0u8; OGS_AUTS_LEN];
        for i in 0..OGS_SQN_LEN {
            auts[i] = sqn_ms[i] ^ ak_star[i];
        }
        auts[6..14].copy_from_slice(&mac_s);
        auts
    }

    /// Network side of resynchronization: validate AUTS and recover SQN_MS
    ///
    /// The length is checked before any cipher work. MAC-S is compared in
    /// constant time.
    pub fn sqn_ms_from_auts(
        &self,
        rand: &[u8; OGS_RAND_LEN],
        auts: &[u8],
    ) -> Result<[u8; OGS_SQN_LEN], MilenageError> {
        if auts.len() != OGS_AUTS_LEN {
            return Err(MilenageError::InvalidLength {
                what: "AUTS",
                expected: OGS_AUTS_LEN,
                actual: auts.len(),
            });
        }
        let (conc, mac_s) = auts.split_at(OGS_SQN_LEN);

        let ak_star = self.f5_star(rand);
        let mut sqn_ms = [0u8; OGS_SQN_LEN];
        for i in 0..OGS_SQN_LEN {
            sqn_ms[i] = conc[i] ^ ak_star[i];
        }

        let expected = self.f1_star(rand, &sqn_ms, &OGS_RESYNC_AMF);
        if bool::from(expected[..].ct_eq(mac_s)) {
            Ok(sqn_ms)
        } else {
            Err(MilenageError::MacMismatch)
        }
    }
}

impl std::fmt::Debug for Milenage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Milenage { .. }")
    }
}

fn derive_opc(cipher: &AesEncContext, op: &[u8; OGS_KEY_LEN]) -> [u8; OGS_KEY_LEN] {
    xor16(&cipher.encrypt_block(op), op)
}

fn xor16(a: &[u8; 16], b: &[u8; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for i in 0..16 {
        out[i] = a[i] ^ b[i];
    }
    out
}

/// Cyclic left rotation of a 128-bit block by `bits`
fn rotate(block: &[u8; 16], bits: u32) -> [u8; 16] {
    u128::from_be_bytes(*block).rotate_left(bits).to_be_bytes()
}

/// Derive OPc = E_K(OP) ^ OP
pub fn milenage_opc(k: &[u8; OGS_KEY_LEN], op: &[u8; OGS_KEY_LEN]) -> [u8; OGS_KEY_LEN] {
    derive_opc(&AesEncContext::new(k), op)
}

/// Milenage f1 and f1*: returns (MAC-A, MAC-S)
pub fn milenage_f1(
    opc: &[u8; OGS_KEY_LEN],
    k: &[u8; OGS_KEY_LEN],
    rand: &[u8; OGS_RAND_LEN],
    sqn: &[u8; OGS_SQN_LEN],
    amf: &[u8; OGS_AMF_LEN],
) -> ([u8; OGS_MAC_LEN], [u8; OGS_MAC_LEN]) {
    Milenage::new(k, opc).f1_and_f1_star(rand, sqn, amf)
}

/// Milenage f2, f3, f4, f5, f5*
pub fn milenage_f2345(
    opc: &[u8; OGS_KEY_LEN],
    k: &[u8; OGS_KEY_LEN],
    rand: &[u8; OGS_RAND_LEN],
) -> F2345Output {
    Milenage::new(k, opc).f2345(rand)
}

/// Generate AUTN, RES, CK, IK and AK for one challenge
pub fn milenage_generate(
    opc: &[u8; OGS_KEY_LEN],
    amf: &[u8; OGS_AMF_LEN],
    k: &[u8; OGS_KEY_LEN],
    sqn: &[u8; OGS_SQN_LEN],
    rand: &[u8; OGS_RAND_LEN],
) -> MilenageOutput {
    Milenage::new(k, opc).generate(rand, sqn, amf)
}

/// Build AUTS as a UE would for a synchronization failure
pub fn milenage_auts(
    opc: &[u8; OGS_KEY_LEN],
    k: &[u8; OGS_KEY_LEN],
    rand: &[u8; OGS_RAND_LEN],
    sqn_ms: &[u8; OGS_SQN_LEN],
) -> [u8; OGS_AUTS_LEN] {
    Milenage::new(k, opc).auts(rand, sqn_ms)
}
