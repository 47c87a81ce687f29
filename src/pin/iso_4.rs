//! ISO 9564 format 4.
//!
//! The AES-based PIN block: a 16-byte PIN field (control 4, length,
//! digits, `A` fill, 8 random tail bytes) is encrypted, XORed with a
//! 16-byte PAN field and encrypted again. The format is twice the width
//! of the DES formats and so is not reachable through the 8-byte codec
//! dispatch; the functions here serve callers that hold an AES key.

use soft_aes::aes::{aes_dec_ecb, aes_enc_ecb};

use super::format::{validate_pin, validate_pin_length_nibble};
use crate::error::HsmError;
use crate::utils::{left_pad_str, right_pad_str, xor_byte_arrays};

const ISO4_PIN_BLOCK_LENGTH: usize = 16;

/// Encode the 16-byte ISO format 4 PIN field.
pub fn encode_pin_field_iso_4(
    pin: &str,
    rnd_seed: &[u8],
) -> Result<[u8; ISO4_PIN_BLOCK_LENGTH], HsmError> {
    validate_pin(pin)?;
    if rnd_seed.len() < 8 {
        return Err(HsmError::InvalidInput(
            "random seed must be at least 8 bytes",
        ));
    }

    let mut field = [0u8; ISO4_PIN_BLOCK_LENGTH];
    field[0] = 0x40 | pin.len() as u8;
    for (i, c) in pin.chars().enumerate() {
        let digit = c.to_digit(10).unwrap() as u8;
        field[1 + i / 2] |= if i % 2 == 0 { digit << 4 } else { digit };
    }
    for i in pin.len()..14 {
        field[1 + i / 2] |= if i % 2 == 0 { 0xA0 } else { 0x0A };
    }
    field[8..].copy_from_slice(&rnd_seed[..8]);
    Ok(field)
}

/// Decode the 16-byte ISO format 4 PIN field.
pub fn decode_pin_field_iso_4(field: &[u8]) -> Result<String, HsmError> {
    if field.len() != ISO4_PIN_BLOCK_LENGTH {
        return Err(HsmError::ExtractionFailed("PIN field must be 16 bytes"));
    }
    if field[0] >> 4 != 0x4 {
        return Err(HsmError::ExtractionFailed("PIN block control field mismatch"));
    }
    let pin_len = (field[0] & 0x0F) as usize;
    validate_pin_length_nibble(pin_len)?;

    let mut pin = String::with_capacity(pin_len);
    for i in 0..pin_len {
        let digit = if i % 2 == 0 {
            field[1 + i / 2] >> 4
        } else {
            field[1 + i / 2] & 0x0F
        };
        if digit > 9 {
            return Err(HsmError::ExtractionFailed("PIN contains an invalid digit"));
        }
        pin.push((b'0' + digit) as char);
    }
    for i in pin_len..14 {
        let filler = if i % 2 == 0 {
            field[1 + i / 2] >> 4
        } else {
            field[1 + i / 2] & 0x0F
        };
        if filler != 0xA {
            return Err(HsmError::ExtractionFailed("PIN block fill is incorrect"));
        }
    }
    Ok(pin)
}

/// Encode the 16-byte ISO format 4 PAN field: PAN length marker, the
/// PAN left-padded to 12 digits, zero fill.
pub fn encode_pan_field_iso_4(pan: &str) -> Result<[u8; ISO4_PIN_BLOCK_LENGTH], HsmError> {
    if pan.is_empty() || pan.len() > 19 || !pan.chars().all(|c| c.is_ascii_digit()) {
        return Err(HsmError::InvalidInput("PAN must be 1 to 19 decimal digits"));
    }

    let len_marker = if pan.len() > 12 {
        (pan.len() - 12).to_string()
    } else {
        "0".to_string()
    };
    let padded = left_pad_str(pan, 12, '0');
    let field_hex = right_pad_str(&format!("{}{}", len_marker, padded), 32, '0');

    let bytes = hex::decode(field_hex)
        .map_err(|_| HsmError::CryptoFailure("PAN field packing failed".to_string()))?;
    Ok(bytes.try_into().expect("32 hex chars make 16 bytes"))
}

/// Encipher an ISO format 4 PIN block under an AES key.
pub fn encipher_pinblock_iso_4(
    key: &[u8],
    pin: &str,
    pan: &str,
    rnd_seed: &[u8],
) -> Result<Vec<u8>, HsmError> {
    let pin_field = encode_pin_field_iso_4(pin, rnd_seed)?;
    let pan_field = encode_pan_field_iso_4(pan)?;

    let block_a = aes_enc_ecb(&pin_field, key, None)
        .map_err(|e| HsmError::CryptoFailure(e.to_string()))?;
    let block_b = xor_byte_arrays(&block_a, &pan_field)?;
    aes_enc_ecb(&block_b, key, None).map_err(|e| HsmError::CryptoFailure(e.to_string()))
}

/// Decipher an ISO format 4 PIN block and extract the PIN.
pub fn decipher_pinblock_iso_4(
    key: &[u8],
    pin_block: &[u8],
    pan: &str,
) -> Result<String, HsmError> {
    if pin_block.len() != ISO4_PIN_BLOCK_LENGTH {
        return Err(HsmError::ExtractionFailed("PIN block must be 16 bytes"));
    }

    let block_b = aes_dec_ecb(pin_block, key, None)
        .map_err(|e| HsmError::CryptoFailure(e.to_string()))?;
    let pan_field = encode_pan_field_iso_4(pan)?;
    let block_a = xor_byte_arrays(&block_b, &pan_field)?;
    let pin_field = aes_dec_ecb(&block_a, key, None)
        .map_err(|e| HsmError::CryptoFailure(e.to_string()))?;

    decode_pin_field_iso_4(&pin_field)
}
