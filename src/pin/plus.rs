//! Plus network format.
//!
//! The ISO format 0 construction bound to the 12 leftmost PAN digits
//! instead of the 12 rightmost.

use super::fields::{pan_field_left12, parse_pin_field_with_control, pin_field_with_control};
use super::format::PIN_BLOCK_LENGTH;
use crate::error::HsmError;
use crate::utils::xor_byte_arrays;

/// Encode a PIN block in the Plus network format.
pub fn encode_pinblock_plus(pin: &str, pan: &str) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    let pin_field = pin_field_with_control(0x0, pin)?;
    let pan_field = pan_field_left12(pan)?;
    let block = xor_byte_arrays(&pin_field, &pan_field)?;
    Ok(block.try_into().expect("XOR preserves the block length"))
}

/// Decode a Plus network PIN block.
pub fn decode_pinblock_plus(
    block: &[u8; PIN_BLOCK_LENGTH],
    pan: &str,
) -> Result<String, HsmError> {
    let pan_field = pan_field_left12(pan)?;
    let field: [u8; PIN_BLOCK_LENGTH] = xor_byte_arrays(block, &pan_field)?
        .try_into()
        .expect("XOR preserves the block length");
    parse_pin_field_with_control(0x0, &field)
}
