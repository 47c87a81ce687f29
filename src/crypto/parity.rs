//! DES key parity helpers and random key generation.
//!
//! DES key material carries one parity bit per byte: a key byte is valid
//! when its bit count is odd. Keys produced by this module are always
//! parity adjusted; keys arriving from the wire are checked by the
//! command handlers after decryption under the LMK.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::HsmError;

/// Check that every byte of the key has odd parity.
pub fn check_key_parity(key: &[u8]) -> bool {
    key.iter().all(|byte| byte.count_ones() % 2 == 1)
}

/// Force odd parity by flipping the lowest bit of every even-parity
/// byte.
pub fn fix_key_parity(key: &mut [u8]) {
    for byte in key.iter_mut() {
        if byte.count_ones() % 2 == 0 {
            *byte ^= 0x01;
        }
    }
}

/// Generate a random, parity-adjusted DES key.
///
/// # Parameters
///
/// * `len`: Key length in bytes; must be 8, 16 or 24.
///
/// # Returns
///
/// * `Ok(Zeroizing<Vec<u8>>)` - Cryptographically random bytes with odd
///   parity, zeroized on drop.
/// * `Err(HsmError)` - If the requested length is not a DES key length.
pub fn generate_random_key(len: usize) -> Result<Zeroizing<Vec<u8>>, HsmError> {
    if !matches!(len, 8 | 16 | 24) {
        return Err(HsmError::CryptoFailure(format!(
            "invalid random key length {}",
            len
        )));
    }
    let mut key = Zeroizing::new(vec![0u8; len]);
    OsRng.fill_bytes(&mut key);
    fix_key_parity(&mut key);
    Ok(key)
}
