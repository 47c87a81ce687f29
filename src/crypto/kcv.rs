//! Key check values.

use super::tdes::tdes_enc_ecb;
use crate::error::HsmError;

/// Compute the check value of a DES key.
///
/// The key is extended to a triple-length 3DES key and run over two
/// blocks of zeros in ECB mode; the first `n_hex` uppercase hex
/// characters of the ciphertext form the check value. Thales commands
/// use 6 characters in key-generation replies and 16 in dedicated
/// check-value replies.
///
/// # Parameters
///
/// * `key`: DES key material of 8, 16 or 24 bytes.
/// * `n_hex`: Number of hex characters to return, at most 32.
///
/// # Returns
///
/// * `Ok(String)` - The truncated uppercase check value.
/// * `Err(HsmError)` - If `n_hex` exceeds the two encrypted blocks or
///   the key length is invalid.
pub fn kcv(key: &[u8], n_hex: usize) -> Result<String, HsmError> {
    if n_hex > 32 {
        return Err(HsmError::ExtractionFailed(
            "check value length exceeds two cipher blocks",
        ));
    }
    let ciphertext = tdes_enc_ecb(&[0u8; 16], key)?;
    let mut check = hex::encode_upper(ciphertext);
    check.truncate(n_hex);
    Ok(check)
}
