//! ISO 9564 format 2.
//!
//! Control nibble 2, PIN length, PIN digits, `F` fill; no PAN binding.
//! The layout is the Mastercard Pay Now & Pay Later PIN field without
//! the PAN XOR.

use super::fields::{parse_pin_field_with_control, pin_field_with_control};
use super::format::PIN_BLOCK_LENGTH;
use crate::error::HsmError;

/// Encode a PIN block in ISO 9564 format 2.
pub fn encode_pinblock_iso_2(pin: &str) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    pin_field_with_control(0x2, pin)
}

/// Decode an ISO 9564 format 2 PIN block.
pub fn decode_pinblock_iso_2(block: &[u8; PIN_BLOCK_LENGTH]) -> Result<String, HsmError> {
    parse_pin_field_with_control(0x2, block)
}
