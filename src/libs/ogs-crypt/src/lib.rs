//! NextGCore Cryptographic Library
//!
//! Cryptographic algorithms used by the UDM authentication credential
//! repository: the Milenage function set and the 3GPP key derivation
//! functions that turn Milenage output into 5G key material.

pub mod aes;        // AES-128 block primitive
pub mod milenage;   // 3GPP Milenage algorithm (TS 35.206)
pub mod kdf;        // Key Derivation Functions (TS 33.220 B.2, TS 33.501 Annex A)


pub use kdf::KdfError;
pub use milenage::{Milenage, MilenageError, MilenageOutput};
