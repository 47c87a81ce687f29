//! DES and Triple-DES helpers.
//!
//! All 3DES entry points accept single (8), double (16) or triple (24)
//! length key material and extend it to a 24-byte EDE3 key before use:
//! a single-length key is replicated three times, a double-length key
//! gets its first half appended. The block functions operate on whole
//! 8-byte blocks; callers are responsible for padding.

use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, BlockEncryptMut, KeyInit, KeyIvInit};
use des::{Des, TdesEde3};
use zeroize::Zeroizing;

use crate::error::HsmError;

/// Length of a DES cipher block in bytes.
pub const DES_BLOCK_LEN: usize = 8;

/// Extend DES key material of length 8, 16 or 24 to a 24-byte EDE3 key.
///
/// # Returns
///
/// * `Ok(Zeroizing<Vec<u8>>)` - The 24-byte key, zeroized on drop.
/// * `Err(HsmError)` - If the input length is not 8, 16 or 24.
pub fn extend_des_key(key: &[u8]) -> Result<Zeroizing<Vec<u8>>, HsmError> {
    let mut extended = Zeroizing::new(Vec::with_capacity(24));
    match key.len() {
        8 => {
            extended.extend_from_slice(key);
            extended.extend_from_slice(key);
            extended.extend_from_slice(key);
        }
        16 => {
            extended.extend_from_slice(key);
            extended.extend_from_slice(&key[..8]);
        }
        24 => extended.extend_from_slice(key),
        other => {
            return Err(HsmError::CryptoFailure(format!(
                "invalid DES key length {}",
                other
            )))
        }
    }
    Ok(extended)
}

fn check_block_aligned(data: &[u8]) -> Result<(), HsmError> {
    if data.is_empty() || data.len() % DES_BLOCK_LEN != 0 {
        return Err(HsmError::CryptoFailure(format!(
            "data length {} is not a multiple of the DES block size",
            data.len()
        )));
    }
    Ok(())
}

/// Encrypt whole blocks with single DES in ECB mode.
pub fn des_enc_ecb(data: &[u8], key: &[u8]) -> Result<Vec<u8>, HsmError> {
    check_block_aligned(data)?;
    let cipher = Des::new_from_slice(key)
        .map_err(|_| HsmError::CryptoFailure("invalid single DES key length".to_string()))?;
    let mut out = data.to_vec();
    for chunk in out.chunks_exact_mut(DES_BLOCK_LEN) {
        cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
    }
    Ok(out)
}

/// Decrypt whole blocks with single DES in ECB mode.
pub fn des_dec_ecb(data: &[u8], key: &[u8]) -> Result<Vec<u8>, HsmError> {
    check_block_aligned(data)?;
    let cipher = Des::new_from_slice(key)
        .map_err(|_| HsmError::CryptoFailure("invalid single DES key length".to_string()))?;
    let mut out = data.to_vec();
    for chunk in out.chunks_exact_mut(DES_BLOCK_LEN) {
        cipher.decrypt_block(GenericArray::from_mut_slice(chunk));
    }
    Ok(out)
}

/// Encrypt whole blocks with 3DES in ECB mode.
///
/// The key may be 8, 16 or 24 bytes and is extended per the module
/// rules.
pub fn tdes_enc_ecb(data: &[u8], key: &[u8]) -> Result<Vec<u8>, HsmError> {
    check_block_aligned(data)?;
    let key = extend_des_key(key)?;
    let cipher = TdesEde3::new_from_slice(&key)
        .map_err(|_| HsmError::CryptoFailure("invalid 3DES key length".to_string()))?;
    let mut out = data.to_vec();
    for chunk in out.chunks_exact_mut(DES_BLOCK_LEN) {
        cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
    }
    Ok(out)
}

/// Decrypt whole blocks with 3DES in ECB mode.
pub fn tdes_dec_ecb(data: &[u8], key: &[u8]) -> Result<Vec<u8>, HsmError> {
    check_block_aligned(data)?;
    let key = extend_des_key(key)?;
    let cipher = TdesEde3::new_from_slice(&key)
        .map_err(|_| HsmError::CryptoFailure("invalid 3DES key length".to_string()))?;
    let mut out = data.to_vec();
    for chunk in out.chunks_exact_mut(DES_BLOCK_LEN) {
        cipher.decrypt_block(GenericArray::from_mut_slice(chunk));
    }
    Ok(out)
}

/// ISO 9797-1 MAC algorithm 3 ("retail MAC") over block-aligned data.
///
/// The data is chained through single DES under the left key half; the
/// final state is decrypted under the right half and re-encrypted under
/// the left half. This is the MAC used by EMV application cryptograms;
/// padding (zero fill for CVN 10, ISO 7816-4 for the session-key CVNs)
/// is applied by the caller.
///
/// # Parameters
///
/// * `key`: A 16-byte double-length DES key.
/// * `data`: The message, a non-zero multiple of 8 bytes.
///
/// # Returns
///
/// * `Ok([u8; 8])` - The 8-byte MAC.
/// * `Err(HsmError)` - If the key is not 16 bytes or the data is not
///   block aligned.
pub fn retail_mac(key: &[u8], data: &[u8]) -> Result<[u8; DES_BLOCK_LEN], HsmError> {
    if key.len() != 16 {
        return Err(HsmError::CryptoFailure(
            "retail MAC requires a double-length key".to_string(),
        ));
    }
    check_block_aligned(data)?;

    let mut blocks: Vec<GenericArray<u8, cipher::consts::U8>> = data
        .chunks_exact(DES_BLOCK_LEN)
        .map(GenericArray::clone_from_slice)
        .collect();

    let mut chain = cbc::Encryptor::<Des>::new_from_slices(&key[..8], &[0u8; DES_BLOCK_LEN])
        .map_err(|_| HsmError::CryptoFailure("invalid retail MAC key half".to_string()))?;
    chain.encrypt_blocks_mut(&mut blocks);

    let mut mac = blocks[blocks.len() - 1];
    let right = Des::new_from_slice(&key[8..16])
        .map_err(|_| HsmError::CryptoFailure("invalid retail MAC key half".to_string()))?;
    let left = Des::new_from_slice(&key[..8])
        .map_err(|_| HsmError::CryptoFailure("invalid retail MAC key half".to_string()))?;
    right.decrypt_block(&mut mac);
    left.encrypt_block(&mut mac);

    Ok(mac.into())
}
