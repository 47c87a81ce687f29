//! ISO 9564 format 1.
//!
//! Control nibble 1, PIN length, PIN digits and random fill; the PAN
//! does not enter the block. The random fill comes from a caller
//! supplied seed so tests stay deterministic.

use super::fields::{get_nibble, set_nibble, validate_seed_len};
use super::format::{validate_pin, validate_pin_length_nibble, PIN_BLOCK_LENGTH};
use crate::error::HsmError;

/// Encode a PIN block in ISO 9564 format 1.
///
/// # Parameters
///
/// * `pin`: Clear PIN of 4 to 12 decimal digits.
/// * `rnd_seed`: At least 8 bytes of random fill material.
pub fn encode_pinblock_iso_1(
    pin: &str,
    rnd_seed: &[u8],
) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    validate_pin(pin)?;
    validate_seed_len(rnd_seed)?;

    let mut block = [0u8; PIN_BLOCK_LENGTH];
    block.copy_from_slice(&rnd_seed[..PIN_BLOCK_LENGTH]);
    block[0] = 0x10 | pin.len() as u8;
    for (i, c) in pin.chars().enumerate() {
        set_nibble(&mut block, 2 + i, c.to_digit(10).unwrap() as u8);
    }
    Ok(block)
}

/// Decode an ISO 9564 format 1 PIN block. The random fill carries no
/// structure, so only the control nibble, length and digits are
/// validated.
pub fn decode_pinblock_iso_1(block: &[u8; PIN_BLOCK_LENGTH]) -> Result<String, HsmError> {
    if block[0] >> 4 != 0x1 {
        return Err(HsmError::ExtractionFailed("PIN block control field mismatch"));
    }
    let pin_len = (block[0] & 0x0F) as usize;
    validate_pin_length_nibble(pin_len)?;

    let mut pin = String::with_capacity(pin_len);
    for i in 0..pin_len {
        let digit = get_nibble(block, 2 + i);
        if digit > 9 {
            return Err(HsmError::ExtractionFailed("PIN contains an invalid digit"));
        }
        pin.push((b'0' + digit) as char);
    }
    Ok(pin)
}
