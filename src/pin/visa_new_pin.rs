//! Visa new-PIN formats.
//!
//! Both formats XOR the PIN data against a key block built from the
//! eight rightmost hex characters of the card's unique derivation key.
//! The new-PIN-only format carries one control-0 PIN field; the
//! new-and-old format additionally folds in the old PIN, zero-padded to
//! the block width.

use super::fields::{parse_pin_field_with_control, pin_field_with_control, set_nibble};
use super::format::{validate_pin, PIN_BLOCK_LENGTH};
use crate::error::HsmError;
use crate::utils::xor_byte_arrays;

/// The XOR key block: `00000000` ‖ eight rightmost UDK hex characters.
fn key_block_from_udk(udk: &str) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    if udk.len() < 8 || !udk.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(HsmError::InvalidInput(
            "derivation key must be at least 8 hex characters",
        ));
    }
    let tail = &udk[udk.len() - 8..];
    let bytes = hex::decode(format!("00000000{}", tail))
        .map_err(|_| HsmError::InvalidInput("derivation key is not hex"))?;
    Ok(bytes.try_into().expect("16 hex chars make 8 bytes"))
}

/// The old PIN zero-padded right across the block.
fn old_pin_block(old_pin: &str) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    validate_pin(old_pin)?;
    let mut block = [0u8; PIN_BLOCK_LENGTH];
    for (i, c) in old_pin.chars().enumerate() {
        set_nibble(&mut block, i, c.to_digit(10).unwrap() as u8);
    }
    Ok(block)
}

/// Encode a PIN block in the Visa new-PIN-only format.
pub fn encode_pinblock_visa_new_only(
    new_pin: &str,
    udk: &str,
) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    let pin_field = pin_field_with_control(0x0, new_pin)?;
    let key_block = key_block_from_udk(udk)?;
    let block = xor_byte_arrays(&pin_field, &key_block)?;
    Ok(block.try_into().expect("XOR preserves the block length"))
}

/// Decode a Visa new-PIN-only block back into the new PIN.
pub fn decode_pinblock_visa_new_only(
    block: &[u8; PIN_BLOCK_LENGTH],
    udk: &str,
) -> Result<String, HsmError> {
    let key_block = key_block_from_udk(udk)?;
    let field: [u8; PIN_BLOCK_LENGTH] = xor_byte_arrays(block, &key_block)?
        .try_into()
        .expect("XOR preserves the block length");
    parse_pin_field_with_control(0x0, &field)
}

/// Encode a PIN block in the Visa new-and-old-PIN format.
pub fn encode_pinblock_visa_new_old(
    new_pin: &str,
    old_pin: &str,
    udk: &str,
) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    let pin_field = pin_field_with_control(0x0, new_pin)?;
    let key_block = key_block_from_udk(udk)?;
    let old_block = old_pin_block(old_pin)?;

    let mixed = xor_byte_arrays(&pin_field, &key_block)?;
    let block = xor_byte_arrays(&mixed, &old_block)?;
    Ok(block.try_into().expect("XOR preserves the block length"))
}

/// Decode a Visa new-and-old-PIN block back into the new PIN.
pub fn decode_pinblock_visa_new_old(
    block: &[u8; PIN_BLOCK_LENGTH],
    old_pin: &str,
    udk: &str,
) -> Result<String, HsmError> {
    let key_block = key_block_from_udk(udk)?;
    let old_block = old_pin_block(old_pin)?;

    let mixed = xor_byte_arrays(block, &old_block)?;
    let field: [u8; PIN_BLOCK_LENGTH] = xor_byte_arrays(&mixed, &key_block)?
        .try_into()
        .expect("XOR preserves the block length");
    parse_pin_field_with_control(0x0, &field)
}
