//! A0 — generate a key.
//!
//! Generates a random key of the requested scheme, wraps it under the
//! LMK for the requested type, and reports its 6-character check value.
//! In mode 1 the caller supplies a ZMK wrapped under the LMK; the new
//! key is additionally exported under that ZMK for interchange.

use super::{CommandContext, CommandReply};
use crate::crypto::{kcv, tdes_enc_ecb};
use crate::error::HsmError;
use crate::lmk::{KeyScheme, KeyType};
use crate::command::FieldCursor;

const GENERATE_ONLY: char = '0';
const GENERATE_AND_EXPORT: char = '1';

pub fn handle(body: &[u8], ctx: &CommandContext) -> Result<CommandReply, HsmError> {
    let mut cursor = FieldCursor::new(body);

    let mode = cursor.take_char("mode")?;
    if mode != GENERATE_ONLY && mode != GENERATE_AND_EXPORT {
        return Err(HsmError::InvalidMode(mode));
    }

    let key_type = KeyType::from_code(cursor.take_str(3, "key type")?)?;

    let scheme_tag = cursor.take_char("key scheme")?;
    let scheme = KeyScheme::from_tag(scheme_tag)?;
    if scheme == KeyScheme::KeyBlock {
        return Err(HsmError::InvalidKeyScheme(scheme_tag));
    }

    let engine = ctx.engine();
    let clear_key = engine.random_key(scheme.key_len())?;
    let check = kcv(&clear_key, 6)?;
    let wrapped = engine.encrypt_under_lmk(&clear_key, key_type, scheme)?;

    let mut payload = scheme.render(&wrapped).into_bytes();

    if mode == GENERATE_AND_EXPORT {
        // The delimiter before the ZMK is tolerated but not required.
        cursor.skip_if(b';');

        let zmk_tag = cursor.take_char("ZMK scheme")?;
        let zmk_scheme =
            KeyScheme::from_tag(zmk_tag).map_err(|_| HsmError::InvalidZmkScheme(zmk_tag))?;
        if zmk_scheme == KeyScheme::KeyBlock {
            return Err(HsmError::InvalidZmkScheme(zmk_tag));
        }
        let wrapped_zmk = cursor.take_hex(zmk_scheme.hex_len(), "ZMK")?;

        let clear_zmk = engine.decrypt_under_lmk(&wrapped_zmk, KeyType::ZMK, zmk_scheme)?;
        let under_zmk = tdes_enc_ecb(&clear_key, &clear_zmk)?;
        payload.extend_from_slice(scheme.render(&under_zmk).as_bytes());
    }

    payload.extend_from_slice(check.as_bytes());
    Ok(CommandReply::ok(payload))
}
