//! Thales key type codes.
//!
//! A key type is a three-digit code such as `000` (ZMK), `001` (ZPK),
//! `002` (TMK/TPK/PVK), `109` (MK-AC) or `402` (CVK). The leading digit
//! selects the variant byte XORed into the LMK pair; the trailing two
//! characters select the pair itself. Commands that carry a two-digit
//! short form expand it by inserting a zero in the middle (`42` is
//! `402`).

use crate::error::HsmError;

/// LMK pair start index per pair code `00`..`0D`.
const PAIR_INDEX: [usize; 14] = [4, 6, 14, 16, 18, 20, 22, 24, 26, 28, 30, 32, 34, 36];

/// Variant byte per leading type digit.
const VARIANTS: [u8; 10] = [0x00, 0xA6, 0x5A, 0x6A, 0xDE, 0x2B, 0x50, 0x74, 0x9C, 0xFA];

/// A validated key type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyType {
    variant_digit: u8,
    pair_code: u8,
}

impl KeyType {
    /// Zone master key, `000`.
    pub const ZMK: KeyType = KeyType { variant_digit: 0, pair_code: 0x00 };
    /// Zone PIN key, `001`.
    pub const ZPK: KeyType = KeyType { variant_digit: 0, pair_code: 0x01 };
    /// Terminal master/PIN key and PIN verification key, `002`.
    pub const TPK: KeyType = KeyType { variant_digit: 0, pair_code: 0x02 };
    /// Base derivation key, `009`.
    pub const BDK: KeyType = KeyType { variant_digit: 0, pair_code: 0x09 };
    /// Application cryptogram master key, `109`.
    pub const MK_AC: KeyType = KeyType { variant_digit: 1, pair_code: 0x09 };
    /// Card verification key, `402`.
    pub const CVK: KeyType = KeyType { variant_digit: 4, pair_code: 0x02 };
    /// ZPK under the interchange variant, `609`.
    pub const ZPK_INTERCHANGE: KeyType = KeyType { variant_digit: 6, pair_code: 0x09 };

    /// Parse a three-character type code.
    pub fn from_code(code: &str) -> Result<Self, HsmError> {
        let bytes = code.as_bytes();
        if bytes.len() != 3 {
            return Err(HsmError::InvalidInput("key type code must be 3 characters"));
        }
        if !bytes[0].is_ascii_digit() || bytes[1] != b'0' {
            return Err(HsmError::InvalidInput("unknown key type code"));
        }
        let pair_code = match bytes[2] {
            b'0'..=b'9' => bytes[2] - b'0',
            b'A'..=b'D' => bytes[2] - b'A' + 10,
            _ => return Err(HsmError::InvalidInput("unknown key type code")),
        };
        Ok(KeyType {
            variant_digit: bytes[0] - b'0',
            pair_code,
        })
    }

    /// Parse a two-character short form by inserting the middle zero.
    pub fn from_short_code(code: &str) -> Result<Self, HsmError> {
        let bytes = code.as_bytes();
        if bytes.len() != 2 {
            return Err(HsmError::InvalidInput("key type code must be 2 characters"));
        }
        let expanded = format!("{}0{}", bytes[0] as char, bytes[1] as char);
        KeyType::from_code(&expanded)
    }

    /// The three-character wire form of this type.
    pub fn code(&self) -> String {
        let last = if self.pair_code < 10 {
            (b'0' + self.pair_code) as char
        } else {
            (b'A' + self.pair_code - 10) as char
        };
        format!("{}0{}", self.variant_digit, last)
    }

    /// Index of the first subkey of the LMK pair this type selects.
    pub fn lmk_pair_index(&self) -> usize {
        PAIR_INDEX[self.pair_code as usize]
    }

    /// The variant byte XORed into the LMK pair for this type.
    pub fn variant_byte(&self) -> u8 {
        VARIANTS[self.variant_digit as usize]
    }
}
