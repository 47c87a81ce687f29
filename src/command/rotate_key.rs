//! HC — generate a replacement TMK/TPK/PVK.
//!
//! The current key arrives wrapped under the LMK; a fresh key of the
//! same length is generated and returned twice, once wrapped under the
//! old key for delivery to the terminal and once wrapped under the LMK
//! for storage. A trailing `%` selector picks a non-default LMK engine
//! from the registry.

use super::{CommandContext, CommandReply};
use crate::command::FieldCursor;
use crate::crypto::{check_key_parity, tdes_enc_ecb};
use crate::error::HsmError;
use crate::lmk::{KeyScheme, KeyType};

pub fn handle(body: &[u8], ctx: &CommandContext) -> Result<CommandReply, HsmError> {
    let mut cursor = FieldCursor::new(body);

    // A bare key field carries 16 hex chars, a single-length key.
    let old_key = cursor.take_key_field(KeyScheme::Single, "current key")?;

    // Optional delimited fields are ignored; only the engine selector
    // after `%` is honoured.
    let mut engine = ctx.engine();
    let rest = cursor.rest();
    if let Some(position) = rest.iter().position(|&b| b == b'%') {
        let id = rest
            .get(position + 1..position + 3)
            .and_then(|id| std::str::from_utf8(id).ok())
            .ok_or(HsmError::InvalidInput("LMK engine id"))?;
        engine = ctx.engine_by_id(id)?;
    }

    let clear_old = engine.decrypt_under_lmk(&old_key.wrapped, KeyType::TPK, old_key.scheme)?;
    if !check_key_parity(&clear_old) {
        return Err(HsmError::KeyParity);
    }

    let new_key = engine.random_key(old_key.scheme.key_len())?;
    let under_old = tdes_enc_ecb(&new_key, &clear_old)?;
    let under_lmk = engine.encrypt_under_lmk(&new_key, KeyType::TPK, old_key.scheme)?;

    let mut payload = old_key.render(&under_old).into_bytes();
    payload.extend_from_slice(old_key.render(&under_lmk).as_bytes());
    Ok(CommandReply::ok(payload))
}
