//! CW / CY — generate and verify Visa card verification values.
//!
//! The CVK arrives either as a tagged double-length key or as two bare
//! single-length halves; both resolve to the same 16 clear bytes under
//! LMK type 402. CY recomputes the CVV and compares it in constant
//! time.

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::{CommandContext, CommandReply};
use crate::command::FieldCursor;
use crate::crypto::{check_key_parity, visa_cvv};
use crate::error::HsmError;
use crate::lmk::{KeyScheme, KeyType};

/// Parse and unwrap the CVK field shared by CW and CY.
fn take_clear_cvk(
    cursor: &mut FieldCursor<'_>,
    ctx: &CommandContext,
) -> Result<Zeroizing<Vec<u8>>, HsmError> {
    let field = cursor.take_key_field(KeyScheme::PairedSingle, "CVK")?;
    if field.scheme != KeyScheme::Double && field.scheme != KeyScheme::PairedSingle {
        return Err(HsmError::KeyNotDoubleLength);
    }

    let engine = ctx.engine_for_scheme(field.scheme)?;
    let clear = engine.decrypt_under_lmk(&field.wrapped, KeyType::CVK, field.scheme)?;
    if clear.len() != 16 {
        return Err(HsmError::KeyNotDoubleLength);
    }
    if !check_key_parity(&clear) {
        return Err(HsmError::KeyParity);
    }
    Ok(clear)
}

fn take_card_fields<'a>(
    cursor: &mut FieldCursor<'a>,
) -> Result<(&'a str, &'a str, &'a str), HsmError> {
    let pan = cursor.take_until(b';', "PAN")?;
    if pan.len() < 13 || pan.len() > 19 {
        return Err(HsmError::InvalidInput("PAN must be 13 to 19 digits"));
    }
    cursor.skip_if(b';');
    let expiry = cursor.take_digits(4, "expiry date")?;
    let service = cursor.take_digits(3, "service code")?;
    Ok((pan, expiry, service))
}

pub fn handle_generate(body: &[u8], ctx: &CommandContext) -> Result<CommandReply, HsmError> {
    let mut cursor = FieldCursor::new(body);

    let cvk = take_clear_cvk(&mut cursor, ctx)?;
    let (pan, expiry, service) = take_card_fields(&mut cursor)?;

    let cvv = visa_cvv(pan, expiry, service, &cvk)?;
    Ok(CommandReply::ok(cvv.into_bytes()))
}

pub fn handle_verify(body: &[u8], ctx: &CommandContext) -> Result<CommandReply, HsmError> {
    let mut cursor = FieldCursor::new(body);

    let cvk = take_clear_cvk(&mut cursor, ctx)?;
    let provided = cursor.take_digits(3, "CVV")?;
    let (pan, expiry, service) = take_card_fields(&mut cursor)?;

    let expected = visa_cvv(pan, expiry, service, &cvk)?;
    if !bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
        return Err(HsmError::VerificationFailed);
    }
    Ok(CommandReply::ok(Vec::new()))
}
