//! ISO 9564 format 0 (ANSI X9.8) and the Mastercard Pay Now & Pay
//! Later variant.
//!
//! Both formats XOR a control-0 or control-2 PIN field with the PAN
//! field built from the 12 rightmost account digits excluding the check
//! digit; they differ only in the control nibble.

use super::fields::{pan_field_right12_excl, parse_pin_field_with_control, pin_field_with_control};
use super::format::PIN_BLOCK_LENGTH;
use crate::error::HsmError;
use crate::utils::xor_byte_arrays;

fn encode_with_control(
    control: u8,
    pin: &str,
    pan: &str,
) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    let pin_field = pin_field_with_control(control, pin)?;
    let pan_field = pan_field_right12_excl(pan)?;
    let block = xor_byte_arrays(&pin_field, &pan_field)?;
    Ok(block.try_into().expect("XOR preserves the block length"))
}

fn decode_with_control(
    control: u8,
    block: &[u8; PIN_BLOCK_LENGTH],
    pan: &str,
) -> Result<String, HsmError> {
    let pan_field = pan_field_right12_excl(pan)?;
    let pin_field: [u8; PIN_BLOCK_LENGTH] = xor_byte_arrays(block, &pan_field)?
        .try_into()
        .expect("XOR preserves the block length");
    parse_pin_field_with_control(control, &pin_field)
}

/// Encode a PIN block in ISO 9564 format 0.
pub fn encode_pinblock_iso_0(pin: &str, pan: &str) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    encode_with_control(0x0, pin, pan)
}

/// Decode an ISO 9564 format 0 PIN block.
pub fn decode_pinblock_iso_0(
    block: &[u8; PIN_BLOCK_LENGTH],
    pan: &str,
) -> Result<String, HsmError> {
    decode_with_control(0x0, block, pan)
}

/// Encode a PIN block in the Mastercard Pay Now & Pay Later format.
pub fn encode_pinblock_mc_pnpl(pin: &str, pan: &str) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    encode_with_control(0x2, pin, pan)
}

/// Decode a Mastercard Pay Now & Pay Later PIN block.
pub fn decode_pinblock_mc_pnpl(
    block: &[u8; PIN_BLOCK_LENGTH],
    pan: &str,
) -> Result<String, HsmError> {
    decode_with_control(0x2, block, pan)
}
