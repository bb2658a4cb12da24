//! Conversion utilities
//!
//! Hex and big-endian integer helpers for fixed-length protocol fields.

use thiserror::Error;

/// Hex conversion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvError {
    #[error("odd number of hex digits ({0})")]
    OddLength(usize),
    #[error("invalid hex digit at offset {0}")]
    InvalidDigit(usize),
    #[error("expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Convert hex string to bytes
///
/// Both upper and lower case digits are accepted. Surrounding whitespace is ignored.
pub fn ogs_hex_from_string(hex: &str) -> Result<Vec<u8>, ConvError> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return Err(ConvError::OddLength(hex.len()));
    }

    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for i in (0..hex.len()).step_by(2) {
        let byte = hex
            .get(i..i + 2)
            .filter(|s| s.bytes().all(|c| c.is_ascii_hexdigit()))
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .ok_or(ConvError::InvalidDigit(i))?;
        bytes.push(byte);
    }
    Ok(bytes)
}

/// Parse a hex string into a fixed-size array, rejecting any other length
pub fn ogs_hex_to_array<const N: usize>(hex: &str) -> Result<[u8; N], ConvError> {
    let bytes = ogs_hex_from_string(hex)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| ConvError::LengthMismatch {
        expected: N,
        actual: bytes.len(),
    })
}

/// Convert bytes to hex string
pub fn ogs_hex_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Convert bytes to uppercase hex string
pub fn ogs_hex_to_string_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Read a big-endian unsigned integer of up to 8 bytes (ogs_buffer_to_uint64)
pub fn ogs_buffer_to_uint64(buf: &[u8]) -> u64 {
    debug_assert!(buf.len() <= 8);
    buf.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// Write `value` big-endian into `buf`, keeping only the low `buf.len()` bytes
/// (ogs_uint64_to_buffer)
pub fn ogs_uint64_to_buffer(value: u64, buf: &mut [u8]) {
    let len = buf.len();
    for (i, byte) in buf.iter_mut().enumerate() {
        let shift = (len - 1 - i) * 8;
        *byte = if shift < 64 { (value >> shift) as u8 } else { 0 };
    }
}
