//! NextGCore Core Library
//!
//! Small utilities shared by the UDM crates: the cryptographically secure
//! random source and octet-string conversions used at the SBI boundary.

pub mod conv;
pub mod rand;

pub use conv::{
    ogs_buffer_to_uint64, ogs_hex_from_string, ogs_hex_to_array, ogs_hex_to_string,
    ogs_hex_to_string_upper, ogs_uint64_to_buffer, ConvError,
};
pub use rand::ogs_random;
