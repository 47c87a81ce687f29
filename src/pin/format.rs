//! PIN-block format dispatch.
//!
//! The two-digit Thales format codes are converted to the closed
//! [`PinBlockFormat`] set at the parser; each format encodes into and
//! decodes from an 8-byte block given a [`PinContext`] carrying the
//! side data the format binds (a PAN, a UDK, an old PIN, a numeric
//! pad). ISO format 4 is AES-based and 16 bytes wide, so it lives
//! outside this dispatch; requesting it here reports an unknown format
//! the same way an unassigned code does.

use rand::rngs::OsRng;
use rand::RngCore;

use super::diebold::{decode_pinblock_diebold, encode_pinblock_diebold};
use super::docutel::{decode_pinblock_docutel, encode_pinblock_docutel};
use super::iso_0::{
    decode_pinblock_iso_0, decode_pinblock_mc_pnpl, encode_pinblock_iso_0,
    encode_pinblock_mc_pnpl,
};
use super::iso_1::{decode_pinblock_iso_1, encode_pinblock_iso_1};
use super::iso_2::{decode_pinblock_iso_2, encode_pinblock_iso_2};
use super::iso_3::{decode_pinblock_iso_3, encode_pinblock_iso_3};
use super::plus::{decode_pinblock_plus, encode_pinblock_plus};
use super::visa_1::{decode_pinblock_visa_1, encode_pinblock_visa_1};
use super::visa_new_pin::{
    decode_pinblock_visa_new_old, decode_pinblock_visa_new_only, encode_pinblock_visa_new_old,
    encode_pinblock_visa_new_only,
};
use crate::error::HsmError;

/// Length of a DES-based PIN block in bytes.
pub const PIN_BLOCK_LENGTH: usize = 8;

/// The PIN-block formats the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinBlockFormat {
    /// ISO 9564 format 0 / ANSI X9.8, wire code `01`.
    Iso0,
    /// Docutel ATM format, wire code `02`.
    Docutel,
    /// Diebold and IBM 3624 format, wire code `03`.
    Diebold,
    /// Plus network format, wire code `04`.
    Plus,
    /// ISO 9564 format 1, wire code `05`.
    Iso1,
    /// ISO 9564 format 2, wire code `34`.
    Iso2,
    /// Mastercard Pay Now & Pay Later, wire code `35`.
    McPayNowPayLater,
    /// Visa new-PIN-only format, wire code `41`.
    VisaNewPinOnly,
    /// Visa new-and-old-PIN format, wire code `42`.
    VisaNewOldPin,
    /// ISO 9564 format 3, wire code `47`.
    Iso3,
    /// ISO 9564 format 4 (AES), wire code `48`; not reachable through
    /// the 8-byte dispatch.
    Iso4,
    /// VISA format 1; carried for library use, no Thales wire code.
    Visa1,
}

impl PinBlockFormat {
    /// Convert a two-digit wire code into a format.
    pub fn from_wire_code(code: &str) -> Result<Self, HsmError> {
        match code {
            "01" => Ok(PinBlockFormat::Iso0),
            "02" => Ok(PinBlockFormat::Docutel),
            "03" => Ok(PinBlockFormat::Diebold),
            "04" => Ok(PinBlockFormat::Plus),
            "05" => Ok(PinBlockFormat::Iso1),
            "34" => Ok(PinBlockFormat::Iso2),
            "35" => Ok(PinBlockFormat::McPayNowPayLater),
            "41" => Ok(PinBlockFormat::VisaNewPinOnly),
            "42" => Ok(PinBlockFormat::VisaNewOldPin),
            "47" => Ok(PinBlockFormat::Iso3),
            "48" => Ok(PinBlockFormat::Iso4),
            other => Err(HsmError::UnknownPinFormat(other.to_string())),
        }
    }

    /// The wire code of this format, if it has one.
    pub fn wire_code(&self) -> Option<&'static str> {
        match self {
            PinBlockFormat::Iso0 => Some("01"),
            PinBlockFormat::Docutel => Some("02"),
            PinBlockFormat::Diebold => Some("03"),
            PinBlockFormat::Plus => Some("04"),
            PinBlockFormat::Iso1 => Some("05"),
            PinBlockFormat::Iso2 => Some("34"),
            PinBlockFormat::McPayNowPayLater => Some("35"),
            PinBlockFormat::VisaNewPinOnly => Some("41"),
            PinBlockFormat::VisaNewOldPin => Some("42"),
            PinBlockFormat::Iso3 => Some("47"),
            PinBlockFormat::Iso4 => Some("48"),
            PinBlockFormat::Visa1 => None,
        }
    }

    /// True when encode/decode for this format needs a PAN context.
    pub fn uses_pan(&self) -> bool {
        matches!(
            self,
            PinBlockFormat::Iso0
                | PinBlockFormat::Iso3
                | PinBlockFormat::Plus
                | PinBlockFormat::McPayNowPayLater
                | PinBlockFormat::Visa1
        )
    }
}

/// Side data a PIN-block format binds into the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinContext<'a> {
    /// No side data.
    None,
    /// Account number digits.
    Pan(&'a str),
    /// Unique derivation key, 16 hex characters or more.
    Udk(&'a str),
    /// Old PIN plus unique derivation key for the new-and-old format.
    OldPinUdk { old_pin: &'a str, udk: &'a str },
    /// Caller-supplied 9-digit numeric pad for Docutel.
    NumericPad(&'a str),
}

impl<'a> PinContext<'a> {
    fn pan(&self) -> Result<&'a str, HsmError> {
        match *self {
            PinContext::Pan(pan) => Ok(pan),
            _ => Err(HsmError::InvalidInput("format requires an account number")),
        }
    }

    fn udk(&self) -> Result<&'a str, HsmError> {
        match *self {
            PinContext::Udk(udk) => Ok(udk),
            PinContext::OldPinUdk { udk, .. } => Ok(udk),
            _ => Err(HsmError::InvalidInput("format requires a derivation key")),
        }
    }

    fn old_pin(&self) -> Result<&'a str, HsmError> {
        match *self {
            PinContext::OldPinUdk { old_pin, .. } => Ok(old_pin),
            _ => Err(HsmError::InvalidInput("format requires the old PIN")),
        }
    }

    fn numeric_pad(&self) -> Result<&'a str, HsmError> {
        match *self {
            PinContext::NumericPad(pad) => Ok(pad),
            _ => Err(HsmError::InvalidInput("format requires a numeric pad")),
        }
    }
}

/// Encode a clear PIN into an 8-byte block in the given format.
pub fn encode_pin_block(
    format: PinBlockFormat,
    pin: &str,
    ctx: PinContext<'_>,
) -> Result<[u8; PIN_BLOCK_LENGTH], HsmError> {
    match format {
        PinBlockFormat::Iso0 => encode_pinblock_iso_0(pin, ctx.pan()?),
        PinBlockFormat::Docutel => encode_pinblock_docutel(pin, ctx.numeric_pad()?),
        PinBlockFormat::Diebold => encode_pinblock_diebold(pin),
        PinBlockFormat::Plus => encode_pinblock_plus(pin, ctx.pan()?),
        PinBlockFormat::Iso1 => {
            let mut seed = [0u8; PIN_BLOCK_LENGTH];
            OsRng.fill_bytes(&mut seed);
            encode_pinblock_iso_1(pin, &seed)
        }
        PinBlockFormat::Iso2 => encode_pinblock_iso_2(pin),
        PinBlockFormat::McPayNowPayLater => encode_pinblock_mc_pnpl(pin, ctx.pan()?),
        PinBlockFormat::VisaNewPinOnly => encode_pinblock_visa_new_only(pin, ctx.udk()?),
        PinBlockFormat::VisaNewOldPin => {
            encode_pinblock_visa_new_old(pin, ctx.old_pin()?, ctx.udk()?)
        }
        PinBlockFormat::Iso3 => {
            let mut seed = [0u8; PIN_BLOCK_LENGTH];
            OsRng.fill_bytes(&mut seed);
            encode_pinblock_iso_3(pin, ctx.pan()?, &seed)
        }
        PinBlockFormat::Iso4 => Err(HsmError::UnknownPinFormat("48".to_string())),
        PinBlockFormat::Visa1 => encode_pinblock_visa_1(pin, ctx.pan()?),
    }
}

/// Decode an 8-byte block in the given format back into the clear PIN.
pub fn decode_pin_block(
    format: PinBlockFormat,
    block: &[u8; PIN_BLOCK_LENGTH],
    ctx: PinContext<'_>,
) -> Result<String, HsmError> {
    match format {
        PinBlockFormat::Iso0 => decode_pinblock_iso_0(block, ctx.pan()?),
        PinBlockFormat::Docutel => decode_pinblock_docutel(block),
        PinBlockFormat::Diebold => decode_pinblock_diebold(block),
        PinBlockFormat::Plus => decode_pinblock_plus(block, ctx.pan()?),
        PinBlockFormat::Iso1 => decode_pinblock_iso_1(block),
        PinBlockFormat::Iso2 => decode_pinblock_iso_2(block),
        PinBlockFormat::McPayNowPayLater => decode_pinblock_mc_pnpl(block, ctx.pan()?),
        PinBlockFormat::VisaNewPinOnly => decode_pinblock_visa_new_only(block, ctx.udk()?),
        PinBlockFormat::VisaNewOldPin => {
            decode_pinblock_visa_new_old(block, ctx.old_pin()?, ctx.udk()?)
        }
        PinBlockFormat::Iso3 => decode_pinblock_iso_3(block, ctx.pan()?),
        PinBlockFormat::Iso4 => Err(HsmError::UnknownPinFormat("48".to_string())),
        PinBlockFormat::Visa1 => decode_pinblock_visa_1(block, ctx.pan()?),
    }
}

/// Validate PIN length and digit set for encoding.
pub(super) fn validate_pin(pin: &str) -> Result<(), HsmError> {
    if pin.len() < 4 || pin.len() > 12 || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(HsmError::InvalidInput(
            "PIN must be between 4 and 12 decimal digits",
        ));
    }
    Ok(())
}

/// Validate a length nibble extracted from a block.
pub(super) fn validate_pin_length_nibble(len: usize) -> Result<(), HsmError> {
    if !(4..=12).contains(&len) {
        return Err(HsmError::ExtractionFailed("PIN length nibble out of range"));
    }
    Ok(())
}
