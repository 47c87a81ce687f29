//! FA — translate a ZPK from encryption under a ZMK to encryption
//! under the LMK.
//!
//! The only command whose status field is not a plain success marker:
//! when the imported ZPK needed its parity fixed, the reply carries the
//! advice value `01` in the status position and the translated key in
//! the payload.

use zeroize::Zeroizing;

use super::{CommandContext, CommandReply};
use crate::command::FieldCursor;
use crate::crypto::{check_key_parity, fix_key_parity, kcv, tdes_dec_ecb};
use crate::error::HsmError;
use crate::lmk::{KeyScheme, KeyType};

pub fn handle(body: &[u8], ctx: &CommandContext) -> Result<CommandReply, HsmError> {
    let mut cursor = FieldCursor::new(body);

    let zmk_field = cursor.take_key_field(KeyScheme::PairedSingle, "ZMK")?;
    let zpk_field = cursor.take_key_field(KeyScheme::PairedSingle, "ZPK")?;

    let engine = ctx.engine();
    let clear_zmk = engine.decrypt_under_lmk(&zmk_field.wrapped, KeyType::ZMK, zmk_field.scheme)?;
    if !check_key_parity(&clear_zmk) {
        return Err(HsmError::KeyParity);
    }

    if zpk_field.wrapped.iter().all(|&b| b == 0) {
        return Err(HsmError::InvalidKey("translated ZPK is all zero"));
    }
    let mut clear_zpk = Zeroizing::new(tdes_dec_ecb(&zpk_field.wrapped, &clear_zmk)?);
    if clear_zpk.iter().all(|&b| b == 0) {
        return Err(HsmError::InvalidKey("translated ZPK is all zero"));
    }

    let advice = if check_key_parity(&clear_zpk) {
        "00"
    } else {
        fix_key_parity(&mut clear_zpk);
        "01"
    };

    let wrapped = engine.encrypt_under_lmk(&clear_zpk, KeyType::ZPK, zpk_field.scheme)?;
    let check = kcv(&clear_zpk, 6)?;

    let mut payload = zpk_field.render(&wrapped).into_bytes();
    payload.extend_from_slice(check.as_bytes());
    Ok(CommandReply::with_status(advice, payload))
}
