//! AES Operations
//!
//! Wrapper around the `aes` crate exposing the single-block AES-128
//! encryption that Milenage is built on.

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;

/// AES block size in bytes
pub const AES_BLOCK_SIZE: usize = 16;

/// AES-128 key size in bytes
pub const AES_128_KEY_SIZE: usize = 16;

/// AES-128 encryption context
///
/// The expanded key schedule is wiped when the context is dropped.
#[derive(Clone)]
pub struct AesEncContext {
    cipher: Aes128,
}

impl AesEncContext {
    /// Set up AES-128 encryption context with the given key
    pub fn new(key: &[u8; AES_128_KEY_SIZE]) -> Self {
        Self {
            cipher: Aes128::new(GenericArray::from_slice(key)),
        }
    }

    /// Encrypt a single 16-byte block
    pub fn encrypt_block(&self, plaintext: &[u8; AES_BLOCK_SIZE]) -> [u8; AES_BLOCK_SIZE] {
        let mut block = GenericArray::clone_from_slice(plaintext);
        self.cipher.encrypt_block(&mut block);
        let mut ciphertext = [0u8; AES_BLOCK_SIZE];
        ciphertext.copy_from_slice(&block);
        ciphertext
    }
}

impl std::fmt::Debug for AesEncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AesEncContext { .. }")
    }
}

/// One-shot AES-128 block encryption
pub fn aes_128_encrypt_block(
    key: &[u8; AES_128_KEY_SIZE],
    plaintext: &[u8; AES_BLOCK_SIZE],
) -> [u8; AES_BLOCK_SIZE] {
    AesEncContext::new(key).encrypt_block(plaintext)
}
