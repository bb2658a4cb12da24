//! Random number generation
//!
//! Backed by the thread-local CSPRNG of the `rand` crate (seeded from the OS).

use rand::RngCore;

/// Fill buffer with random bytes (ogs_random)
pub fn ogs_random(buf: &mut [u8]) {
    rand::rng().fill_bytes(buf);
}

/// Return a fresh random array of `N` bytes
pub fn ogs_random_array<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    ogs_random(&mut buf);
    buf
}
