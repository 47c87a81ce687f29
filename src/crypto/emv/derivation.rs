//! EMV key derivation.
//!
//! Issuer master keys (IMK) are diversified per card into ICC master
//! keys, and ICC master keys are diversified per transaction into
//! session keys. Derivation Option A covers PANs of up to 16 digits;
//! Option B hashes longer PANs down to a 16-digit proxy first. Session
//! keys use the EMV common session key derivation seeded by the
//! application transaction counter.

use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

use crate::crypto::parity::fix_key_parity;
use crate::crypto::tdes::tdes_enc_ecb;
use crate::error::HsmError;
use crate::utils::{left_pad_str, pack_bcd};

/// Build the 16-digit diversification string for Option A: the
/// rightmost 16 digits of PAN ‖ PSN, left-padded with zeros when
/// shorter.
fn diversification_digits(pan: &str, psn: &str) -> Result<String, HsmError> {
    if pan.is_empty() || !pan.chars().all(|c| c.is_ascii_digit()) {
        return Err(HsmError::InvalidInput("PAN must be decimal digits"));
    }
    if psn.len() != 2 || !psn.chars().all(|c| c.is_ascii_digit()) {
        return Err(HsmError::InvalidInput("PSN must be 2 decimal digits"));
    }

    let combined = format!("{}{}", pan, psn);
    let digits = if combined.len() > 16 {
        combined[combined.len() - 16..].to_string()
    } else {
        left_pad_str(&combined, 16, '0')
    };
    Ok(digits)
}

fn derive_from_digits(imk: &[u8], digits: &str) -> Result<Zeroizing<Vec<u8>>, HsmError> {
    let y = pack_bcd(digits)?;
    let y_inverted: Vec<u8> = y.iter().map(|b| !b).collect();

    let left = tdes_enc_ecb(&y, imk)?;
    let right = tdes_enc_ecb(&y_inverted, imk)?;

    let mut mk = Zeroizing::new(Vec::with_capacity(16));
    mk.extend_from_slice(&left);
    mk.extend_from_slice(&right);
    fix_key_parity(&mut mk);
    Ok(mk)
}

/// Derive an ICC master key with EMV Option A.
///
/// The rightmost 16 BCD digits of PAN ‖ PSN are encrypted under the IMK,
/// the bitwise inverse is encrypted again, and the concatenation is
/// parity adjusted.
///
/// # Parameters
///
/// * `imk`: 16-byte issuer master key.
/// * `pan`: Primary account number digits.
/// * `psn`: 2-digit PAN sequence number.
///
/// # Returns
///
/// * `Ok(Zeroizing<Vec<u8>>)` - The 16-byte ICC master key.
/// * `Err(HsmError)` - If the IMK is not double length or a field is
///   malformed.
pub fn derive_icc_mk_a(imk: &[u8], pan: &str, psn: &str) -> Result<Zeroizing<Vec<u8>>, HsmError> {
    if imk.len() != 16 {
        return Err(HsmError::KeyNotDoubleLength);
    }
    let digits = diversification_digits(pan, psn)?;
    derive_from_digits(imk, &digits)
}

/// Derive an ICC master key with EMV Option B.
///
/// PANs of 16 digits or fewer fall through to Option A. Longer PANs are
/// packed with the PSN as BCD, hashed with SHA-1, and the hash nibbles
/// decimalized (decimal digits first, then A..F mapped to 0..5) to a
/// 16-digit proxy that feeds the Option A core.
pub fn derive_icc_mk_b(imk: &[u8], pan: &str, psn: &str) -> Result<Zeroizing<Vec<u8>>, HsmError> {
    if imk.len() != 16 {
        return Err(HsmError::KeyNotDoubleLength);
    }
    if pan.len() <= 16 {
        return derive_icc_mk_a(imk, pan, psn);
    }
    if psn.len() != 2 || !psn.chars().all(|c| c.is_ascii_digit()) {
        return Err(HsmError::InvalidInput("PSN must be 2 decimal digits"));
    }

    let mut combined = format!("{}{}", pan, psn);
    if combined.len() % 2 != 0 {
        combined.insert(0, '0');
    }
    let packed = pack_bcd(&combined)?;
    let digest = Sha1::digest(&packed);
    let digest_hex = hex::encode_upper(digest);

    let mut digits = String::with_capacity(16);
    for c in digest_hex.chars() {
        if digits.len() == 16 {
            break;
        }
        if c.is_ascii_digit() {
            digits.push(c);
        }
    }
    for c in digest_hex.chars() {
        if digits.len() == 16 {
            break;
        }
        if let 'A'..='F' = c {
            digits.push((b'0' + (c as u8 - b'A')) as char);
        }
    }

    derive_from_digits(imk, &digits)
}

/// Derive a transaction session key with the EMV common session key
/// scheme.
///
/// Two diversification blocks are seeded with the ATC and branch bytes
/// `F0`/`0F` at offset 2; each is encrypted under the ICC master key and
/// the halves concatenated and parity adjusted.
///
/// # Parameters
///
/// * `mk`: 16-byte ICC master key.
/// * `atc`: 2-byte application transaction counter.
///
/// # Returns
///
/// * `Ok(Zeroizing<Vec<u8>>)` - The 16-byte session key.
/// * `Err(HsmError)` - If the master key is not double length.
pub fn derive_common_session_key(
    mk: &[u8],
    atc: &[u8; 2],
) -> Result<Zeroizing<Vec<u8>>, HsmError> {
    if mk.len() != 16 {
        return Err(HsmError::KeyNotDoubleLength);
    }

    let mut left_input = [0u8; 8];
    left_input[0] = atc[0];
    left_input[1] = atc[1];
    left_input[2] = 0xF0;
    let mut right_input = left_input;
    right_input[2] = 0x0F;

    let left = tdes_enc_ecb(&left_input, mk)?;
    let right = tdes_enc_ecb(&right_input, mk)?;

    let mut sk = Zeroizing::new(Vec::with_capacity(16));
    sk.extend_from_slice(&left);
    sk.extend_from_slice(&right);
    fix_key_parity(&mut sk);
    Ok(sk)
}
