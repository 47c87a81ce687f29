//! DC / EC — verify a PIN against a Visa PIN verification value.
//!
//! The two commands share their body layout and differ only in the key
//! type of the outer PIN-encryption key: DC decrypts the PIN block
//! under a terminal PIN key, EC under a zone PIN key. The PVK arrives
//! as a tagged double-length key or two bare halves; halves that fail
//! parity report the PVK-specific code.

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::{CommandContext, CommandReply};
use crate::command::FieldCursor;
use crate::crypto::{check_key_parity, tdes_dec_ecb, visa_pvv};
use crate::error::HsmError;
use crate::lmk::{KeyScheme, KeyType};
use crate::pin::{decode_pin_block, PinBlockFormat, PinContext};

fn verify(body: &[u8], ctx: &CommandContext, outer_type: KeyType) -> Result<CommandReply, HsmError> {
    let mut cursor = FieldCursor::new(body);

    let outer_key = cursor.take_key_field(KeyScheme::PairedSingle, "PIN key")?;
    let engine = ctx.engine_for_scheme(outer_key.scheme)?;
    let clear_outer = engine.decrypt_under_lmk(&outer_key.wrapped, outer_type, outer_key.scheme)?;
    if !check_key_parity(&clear_outer) {
        return Err(HsmError::KeyParity);
    }

    let pvk_field = cursor.take_key_field(KeyScheme::PairedSingle, "PVK")?;
    if pvk_field.scheme != KeyScheme::Double && pvk_field.scheme != KeyScheme::PairedSingle {
        return Err(HsmError::KeyNotDoubleLength);
    }
    let pvk_engine = ctx.engine_for_scheme(pvk_field.scheme)?;
    let clear_pvk = pvk_engine.decrypt_under_lmk(&pvk_field.wrapped, KeyType::TPK, pvk_field.scheme)?;
    if !check_key_parity(&clear_pvk[..8]) || !check_key_parity(&clear_pvk[8..]) {
        return Err(HsmError::InvalidKey("PVK parity error"));
    }

    let pin_block = cursor.take_hex(16, "PIN block")?;
    let format = PinBlockFormat::from_wire_code(cursor.take_str(2, "PIN block format")?)?;
    let account = cursor.take_digits(12, "account number")?;
    let pvki = cursor.take_char("PVKI")?;
    let provided_pvv = cursor.take_digits(4, "PVV")?;

    let clear_block = Zeroizing::new(tdes_dec_ecb(&pin_block, &clear_outer)?);
    let block: &[u8; 8] = clear_block
        .as_slice()
        .try_into()
        .expect("16 hex chars make one block");

    let pin_ctx = if format.uses_pan() {
        PinContext::Pan(account)
    } else {
        PinContext::None
    };
    let pin = Zeroizing::new(decode_pin_block(format, block, pin_ctx)?);

    let expected = visa_pvv(account, pvki, &pin, &clear_pvk)?;
    if !bool::from(expected.as_bytes().ct_eq(provided_pvv.as_bytes())) {
        return Err(HsmError::VerificationFailed);
    }
    Ok(CommandReply::ok(Vec::new()))
}

/// DC: the PIN block is encrypted under a TPK.
pub fn handle_tpk(body: &[u8], ctx: &CommandContext) -> Result<CommandReply, HsmError> {
    verify(body, ctx, KeyType::TPK)
}

/// EC: the PIN block is encrypted under a ZPK.
pub fn handle_zpk(body: &[u8], ctx: &CommandContext) -> Result<CommandReply, HsmError> {
    verify(body, ctx, KeyType::ZPK)
}
