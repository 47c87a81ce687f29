//! Docutel ATM format.
//!
//! Length nibble, the PIN zero-padded to six digits, then a 9-digit
//! caller-supplied numeric pad. Docutel PINs are at most six digits.

use super::fields::{get_nibble, set_nibble};
use super::format::PIN_BLOCK_LENGTH;
use crate::error::HsmError;

/// Encode a PIN block in the Docutel format.
///
/// # Parameters
///
/// * `pin`: Clear PIN of 4 to 6 decimal digits.
/// * `pad`: Caller-supplied pad of exactly 9 decimal digits.
pub fn encode_pinblock_docutel(pin: &str, pad: &str) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    if pin.len() < 4 || pin.len() > 6 || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(HsmError::InvalidInput(
            "Docutel PIN must be between 4 and 6 decimal digits",
        ));
    }
    if pad.len() != 9 || !pad.chars().all(|c| c.is_ascii_digit()) {
        return Err(HsmError::InvalidInput(
            "Docutel pad must be 9 decimal digits",
        ));
    }

    let mut block = [0u8; PIN_BLOCK_LENGTH];
    set_nibble(&mut block, 0, pin.len() as u8);
    for (i, c) in pin.chars().enumerate() {
        set_nibble(&mut block, 1 + i, c.to_digit(10).unwrap() as u8);
    }
    for (i, c) in pad.chars().enumerate() {
        set_nibble(&mut block, 7 + i, c.to_digit(10).unwrap() as u8);
    }
    Ok(block)
}

/// Decode a Docutel PIN block.
pub fn decode_pinblock_docutel(block: &[u8; PIN_BLOCK_LENGTH]) -> Result<String, HsmError> {
    let pin_len = get_nibble(block, 0) as usize;
    if !(4..=6).contains(&pin_len) {
        return Err(HsmError::ExtractionFailed("PIN length nibble out of range"));
    }

    let mut pin = String::with_capacity(pin_len);
    for i in 0..pin_len {
        let digit = get_nibble(block, 1 + i);
        if digit > 9 {
            return Err(HsmError::ExtractionFailed("PIN contains an invalid digit"));
        }
        pin.push((b'0' + digit) as char);
    }
    // Zero fill between the PIN and the pad, numeric pad after it.
    for i in pin_len..6 {
        if get_nibble(block, 1 + i) != 0 {
            return Err(HsmError::ExtractionFailed("PIN block fill is incorrect"));
        }
    }
    for i in 7..16 {
        if get_nibble(block, i) > 9 {
            return Err(HsmError::ExtractionFailed("PIN block pad is not numeric"));
        }
    }
    Ok(pin)
}
