//! Visa PIN verification values and card verification values.
//!
//! Both algorithms end in the same decimalization step: the hex digits
//! of a 3DES ciphertext are scanned left to right and the decimal digits
//! are collected first; if too few are found, a second scan maps the
//! remaining nibbles A through F to 0 through 5 and takes them in order.

use crate::crypto::tdes::{des_enc_ecb, tdes_enc_ecb};
use crate::error::HsmError;
use crate::utils::{pack_bcd, right_pad_str, xor_byte_arrays};

/// Collect `n` decimal digits from an uppercase hex string using the
/// Visa decimalization scan.
fn decimalize(hex_digits: &str, n: usize) -> String {
    let mut out = String::with_capacity(n);
    for c in hex_digits.chars() {
        if out.len() == n {
            return out;
        }
        if c.is_ascii_digit() {
            out.push(c);
        }
    }
    for c in hex_digits.chars() {
        if out.len() == n {
            break;
        }
        if let 'A'..='F' = c {
            out.push((b'0' + (c as u8 - b'A')) as char);
        }
    }
    out
}

/// Compute the 4-digit Visa PIN verification value.
///
/// The transformed security parameter is built from the last eleven
/// digits of the account number field, the PVKI digit and the first four
/// PIN digits, packed as BCD and encrypted with the PVK extended to a
/// triple-length key.
///
/// # Parameters
///
/// * `account`: Account number field, at least 11 decimal digits.
/// * `pvki`: PIN verification key indicator, a single decimal digit.
/// * `pin`: Clear PIN, at least 4 decimal digits.
/// * `pvk`: The 16-byte PIN verification key.
///
/// # Returns
///
/// * `Ok(String)` - The 4-digit PVV.
/// * `Err(HsmError)` - If a field is malformed or the PVK length is
///   wrong.
pub fn visa_pvv(account: &str, pvki: char, pin: &str, pvk: &[u8]) -> Result<String, HsmError> {
    if account.len() < 11 || !account.chars().all(|c| c.is_ascii_digit()) {
        return Err(HsmError::InvalidInput(
            "account number must be at least 11 decimal digits",
        ));
    }
    if !pvki.is_ascii_digit() {
        return Err(HsmError::InvalidInput("PVKI must be a decimal digit"));
    }
    if pin.len() < 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(HsmError::InvalidInput("PIN must be at least 4 digits"));
    }
    if pvk.len() != 16 {
        return Err(HsmError::KeyNotDoubleLength);
    }

    let mut tsp = String::with_capacity(16);
    tsp.push_str(&account[account.len() - 11..]);
    tsp.push(pvki);
    tsp.push_str(&pin[..4]);

    let block = pack_bcd(&tsp)?;
    let ciphertext = tdes_enc_ecb(&block, pvk)?;

    Ok(decimalize(&hex::encode_upper(ciphertext), 4))
}

/// Compute the 3-digit Visa card verification value.
///
/// The BCD of the PAN (right-padded with zeros to 16 digits, longer PANs
/// contribute their leftmost 16) is encrypted with single DES under the
/// first key third, XORed with `expiry ‖ service code ‖ zero fill`, and
/// the result encrypted with the full triple-length key.
///
/// # Parameters
///
/// * `pan`: Primary account number, 13 to 19 decimal digits.
/// * `expiry`: Expiry date, 4 decimal digits.
/// * `service`: Service code, 3 decimal digits.
/// * `cvk`: Card verification key of 16 or 24 bytes.
///
/// # Returns
///
/// * `Ok(String)` - The 3-digit CVV.
/// * `Err(HsmError)` - If a field is malformed or the key length is
///   wrong.
pub fn visa_cvv(pan: &str, expiry: &str, service: &str, cvk: &[u8]) -> Result<String, HsmError> {
    if pan.len() < 13 || pan.len() > 19 || !pan.chars().all(|c| c.is_ascii_digit()) {
        return Err(HsmError::InvalidInput("PAN must be 13 to 19 decimal digits"));
    }
    if expiry.len() != 4 || !expiry.chars().all(|c| c.is_ascii_digit()) {
        return Err(HsmError::InvalidInput("expiry date must be 4 digits"));
    }
    if service.len() != 3 || !service.chars().all(|c| c.is_ascii_digit()) {
        return Err(HsmError::InvalidInput("service code must be 3 digits"));
    }
    if !matches!(cvk.len(), 16 | 24) {
        return Err(HsmError::KeyNotDoubleLength);
    }

    let pan16 = if pan.len() > 16 {
        pan[..16].to_string()
    } else {
        right_pad_str(pan, 16, '0')
    };
    let pan_block = pack_bcd(&pan16)?;

    let left = des_enc_ecb(&pan_block, &cvk[..8])?;
    let date_field = hex::decode(format!("{}{}{}", expiry, service, "000000000"))
        .map_err(|_| HsmError::InvalidInput("expiry or service code not numeric"))?;
    let mixed = xor_byte_arrays(&left, &date_field)?;
    let ciphertext = tdes_enc_ecb(&mixed, cvk)?;

    Ok(decimalize(&hex::encode_upper(ciphertext), 3))
}
