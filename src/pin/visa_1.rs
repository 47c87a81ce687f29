//! VISA format 1.
//!
//! No control nibble: the first nibble is the PIN length, followed by
//! the PIN digits and `F` fill, XORed with the PAN field over the 12
//! rightmost digits including the check digit. The format has no Thales
//! wire code and is carried for library use.

use super::fields::{get_nibble, pan_field_right12_incl, set_nibble};
use super::format::{validate_pin, validate_pin_length_nibble, PIN_BLOCK_LENGTH};
use crate::error::HsmError;
use crate::utils::xor_byte_arrays;

/// Encode a PIN block in VISA format 1.
pub fn encode_pinblock_visa_1(pin: &str, pan: &str) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    validate_pin(pin)?;

    let mut field = [0xFFu8; PIN_BLOCK_LENGTH];
    field[0] = ((pin.len() as u8) << 4) | 0x0F;
    for (i, c) in pin.chars().enumerate() {
        set_nibble(&mut field, 1 + i, c.to_digit(10).unwrap() as u8);
    }

    let pan_field = pan_field_right12_incl(pan)?;
    let block = xor_byte_arrays(&field, &pan_field)?;
    Ok(block.try_into().expect("XOR preserves the block length"))
}

/// Decode a VISA format 1 PIN block.
pub fn decode_pinblock_visa_1(
    block: &[u8; PIN_BLOCK_LENGTH],
    pan: &str,
) -> Result<String, HsmError> {
    let pan_field = pan_field_right12_incl(pan)?;
    let field: [u8; PIN_BLOCK_LENGTH] = xor_byte_arrays(block, &pan_field)?
        .try_into()
        .expect("XOR preserves the block length");

    let pin_len = (field[0] >> 4) as usize;
    validate_pin_length_nibble(pin_len)?;

    let mut pin = String::with_capacity(pin_len);
    for i in 0..pin_len {
        let digit = get_nibble(&field, 1 + i);
        if digit > 9 {
            return Err(HsmError::ExtractionFailed("PIN contains an invalid digit"));
        }
        pin.push((b'0' + digit) as char);
    }
    for i in pin_len..15 {
        if get_nibble(&field, 1 + i) != 0xF {
            return Err(HsmError::ExtractionFailed("PIN block fill is incorrect"));
        }
    }
    Ok(pin)
}
