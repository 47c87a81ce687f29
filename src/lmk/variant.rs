//! The legacy variant LMK engine.
//!
//! The LMK set is 40 single-length subkeys. A key type selects a pair
//! of adjacent subkeys whose concatenation forms a double-length 3DES
//! key; the type's variant byte is XORed into the first byte of the
//! second half, and triple-length schemes fold an additional offset
//! into the first half. Wrapping runs 3DES-ECB over each 8-byte block
//! of the clear key independently.

use zeroize::Zeroizing;

use super::key_type::KeyType;
use super::provider::LmkProvider;
use super::scheme::KeyScheme;
use crate::crypto::{tdes_dec_ecb, tdes_enc_ecb};
use crate::error::HsmError;

/// Offset XORed into the first pair half for triple-length schemes.
const TRIPLE_SCHEME_OFFSET: u8 = 0x6A;

/// Number of subkeys in a variant LMK set.
pub const VARIANT_LMK_SUBKEYS: usize = 40;

/// A variant LMK engine holding the full 40-subkey set.
pub struct VariantLmk {
    subkeys: Zeroizing<Vec<[u8; 8]>>,
}

impl VariantLmk {
    /// Build an engine from a full subkey set.
    pub fn new(subkeys: Vec<[u8; 8]>) -> Result<Self, HsmError> {
        if subkeys.len() != VARIANT_LMK_SUBKEYS {
            return Err(HsmError::LmkFailure(format!(
                "variant LMK set must contain {} subkeys, got {}",
                VARIANT_LMK_SUBKEYS,
                subkeys.len()
            )));
        }
        Ok(VariantLmk {
            subkeys: Zeroizing::new(subkeys),
        })
    }

    /// Assemble the variant-adjusted 3DES key for a type and scheme.
    fn pair_key(&self, key_type: KeyType, scheme: KeyScheme) -> Zeroizing<[u8; 16]> {
        let index = key_type.lmk_pair_index();
        let mut key = Zeroizing::new([0u8; 16]);
        key[..8].copy_from_slice(&self.subkeys[index]);
        key[8..].copy_from_slice(&self.subkeys[index + 1]);

        key[8] ^= key_type.variant_byte();
        if matches!(scheme, KeyScheme::Triple | KeyScheme::PairedTriple) {
            key[0] ^= TRIPLE_SCHEME_OFFSET;
        }
        key
    }

    fn check_scheme(scheme: KeyScheme, len: usize) -> Result<(), HsmError> {
        if !scheme.is_variant() {
            return Err(HsmError::LmkFailure(
                "key blocks are not handled by the variant engine".to_string(),
            ));
        }
        if len != scheme.key_len() {
            return Err(HsmError::LmkFailure(format!(
                "key length {} does not match the scheme length {}",
                len,
                scheme.key_len()
            )));
        }
        Ok(())
    }
}

impl LmkProvider for VariantLmk {
    fn encrypt_under_lmk(
        &self,
        clear_key: &[u8],
        key_type: KeyType,
        scheme: KeyScheme,
    ) -> Result<Vec<u8>, HsmError> {
        Self::check_scheme(scheme, clear_key.len())?;
        let pair = self.pair_key(key_type, scheme);
        tdes_enc_ecb(clear_key, pair.as_ref())
    }

    fn decrypt_under_lmk(
        &self,
        encrypted_key: &[u8],
        key_type: KeyType,
        scheme: KeyScheme,
    ) -> Result<Zeroizing<Vec<u8>>, HsmError> {
        Self::check_scheme(scheme, encrypted_key.len())?;
        let pair = self.pair_key(key_type, scheme);
        Ok(Zeroizing::new(tdes_dec_ecb(encrypted_key, pair.as_ref())?))
    }

    fn check_value(&self) -> Result<String, HsmError> {
        // Check value of the set itself: the all-zero block under the
        // unmodified first pair.
        let mut pair = Zeroizing::new([0u8; 16]);
        pair[..8].copy_from_slice(&self.subkeys[0]);
        pair[8..].copy_from_slice(&self.subkeys[1]);
        let ciphertext = tdes_enc_ecb(&[0u8; 16], pair.as_ref())?;
        let mut check = hex::encode_upper(ciphertext);
        check.truncate(16);
        Ok(check)
    }
}
