//! Sequence Number Arithmetic
//!
//! SQN is a 48-bit big-endian counter. It is carried as 6 octets on the
//! wire and as 12 uppercase hex digits in storage.

use ogs_core::{ogs_buffer_to_uint64, ogs_hex_to_array, ogs_uint64_to_buffer};
use ogs_crypt::milenage::OGS_SQN_LEN;

use crate::error::{UdmError, UdmResult};

/// Largest representable SQN
pub const OGS_MAX_SQN: u64 = 0xFFFF_FFFF_FFFF;

/// current + 1 modulo 2^48
pub fn next_sqn(current: u64) -> u64 {
    current.wrapping_add(1) & OGS_MAX_SQN
}

pub fn sqn_to_buffer(sqn: u64) -> [u8; OGS_SQN_LEN] {
    let mut buf = [0u8; OGS_SQN_LEN];
    ogs_uint64_to_buffer(sqn & OGS_MAX_SQN, &mut buf);
    buf
}

pub fn sqn_from_buffer(buf: &[u8; OGS_SQN_LEN]) -> u64 {
    ogs_buffer_to_uint64(buf)
}

/// 12 uppercase hex digits, zero padded
pub fn sqn_to_hex(sqn: u64) -> String {
    format!("{:012X}", sqn & OGS_MAX_SQN)
}

/// Parse a stored sequenceNumber
pub fn sqn_from_hex(hex: &str) -> UdmResult<u64> {
    ogs_hex_to_array::<OGS_SQN_LEN>(hex)
        .map(|buf| sqn_from_buffer(&buf))
        .map_err(|e| UdmError::IncompleteCredentials(format!("Invalid sequenceNumber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_sqn() {
        assert_eq!(next_sqn(0), 1);
        assert_eq!(next_sqn(0x0000_0000_0020), 0x21);
        assert_eq!(next_sqn(OGS_MAX_SQN), 0);
    }

    #[test]
    fn test_sqn_hex() {
        assert_eq!(sqn_to_hex(0x21), "000000000021");
        assert_eq!(sqn_to_hex(0xFF9B_B4D0_B607), "FF9BB4D0B607");
        assert_eq!(sqn_from_hex("ff9bb4d0b607").unwrap(), 0xFF9B_B4D0_B607);
        assert!(matches!(sqn_from_hex("123"), Err(UdmError::IncompleteCredentials(_))));
        assert!(sqn_from_hex("00000000000000").is_err());
        assert!(sqn_from_hex("").is_err());
    }

    #[test]
    fn test_sqn_buffer() {
        let buf = sqn_to_buffer(0xFF9B_B4D0_B607);
        assert_eq!(buf, [0xFF, 0x9B, 0xB4, 0xD0, 0xB6, 0x07]);
        assert_eq!(sqn_from_buffer(&buf), 0xFF9B_B4D0_B607);
    }

    #[test]
    fn test_wrap_encoding() {
        assert_eq!(sqn_to_hex(next_sqn(OGS_MAX_SQN)), "000000000000");
    }
}
