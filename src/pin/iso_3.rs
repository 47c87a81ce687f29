//! ISO 9564 format 3.
//!
//! Format 3 is format 0 with control nibble 3 and random fill from the
//! range A..F instead of the fixed `F` nibble. The fill nibbles come
//! from a caller supplied seed mapped into A..F, and the PIN field is
//! XORed with the PAN field over the 12 rightmost account digits
//! excluding the check digit.

use super::fields::{
    get_nibble, pan_field_right12_excl, set_nibble, validate_seed_len,
};
use super::format::{validate_pin, validate_pin_length_nibble, PIN_BLOCK_LENGTH};
use crate::error::HsmError;
use crate::utils::{transform_nibbles_to_af, xor_byte_arrays};

/// Encode the PIN field for ISO 9564 format 3: control, length, BCD
/// digits, A..F fill from the transformed seed.
pub fn encode_pin_field_iso_3(
    pin: &str,
    rnd_seed: &[u8],
) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    validate_pin(pin)?;
    validate_seed_len(rnd_seed)?;

    let transformed = transform_nibbles_to_af(&rnd_seed[..PIN_BLOCK_LENGTH]);
    let mut field = [0u8; PIN_BLOCK_LENGTH];
    field.copy_from_slice(&transformed);

    field[0] = 0x30 | pin.len() as u8;
    for (i, c) in pin.chars().enumerate() {
        set_nibble(&mut field, 2 + i, c.to_digit(10).unwrap() as u8);
    }
    Ok(field)
}

/// Decode an ISO 9564 format 3 PIN field, validating the control
/// nibble, the length, the digit set and the A..F fill.
pub fn decode_pin_field_iso_3(field: &[u8; PIN_BLOCK_LENGTH]) -> Result<String, HsmError> {
    if field[0] >> 4 != 0x3 {
        return Err(HsmError::ExtractionFailed("PIN block control field mismatch"));
    }
    let pin_len = (field[0] & 0x0F) as usize;
    validate_pin_length_nibble(pin_len)?;

    let mut pin = String::with_capacity(pin_len);
    for i in 0..pin_len {
        let digit = get_nibble(field, 2 + i);
        if digit > 9 {
            return Err(HsmError::ExtractionFailed("PIN contains an invalid digit"));
        }
        pin.push((b'0' + digit) as char);
    }
    for i in pin_len..14 {
        if !(0xA..=0xF).contains(&get_nibble(field, 2 + i)) {
            return Err(HsmError::ExtractionFailed("PIN block fill is incorrect"));
        }
    }
    Ok(pin)
}

/// Encode a PIN block in ISO 9564 format 3.
pub fn encode_pinblock_iso_3(
    pin: &str,
    pan: &str,
    rnd_seed: &[u8],
) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    let pin_field = encode_pin_field_iso_3(pin, rnd_seed)?;
    let pan_field = pan_field_right12_excl(pan)?;
    let block = xor_byte_arrays(&pin_field, &pan_field)?;
    Ok(block.try_into().expect("XOR preserves the block length"))
}

/// Decode an ISO 9564 format 3 PIN block.
pub fn decode_pinblock_iso_3(
    block: &[u8; PIN_BLOCK_LENGTH],
    pan: &str,
) -> Result<String, HsmError> {
    let pan_field = pan_field_right12_excl(pan)?;
    let field: [u8; PIN_BLOCK_LENGTH] = xor_byte_arrays(block, &pan_field)?
        .try_into()
        .expect("XOR preserves the block length");
    decode_pin_field_iso_3(&field)
}
