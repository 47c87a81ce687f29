//! BU — generate a key check value for a provided key.

use super::{CommandContext, CommandReply};
use crate::command::FieldCursor;
use crate::crypto::{check_key_parity, kcv};
use crate::error::HsmError;
use crate::lmk::{KeyScheme, KeyType};

pub fn handle(body: &[u8], ctx: &CommandContext) -> Result<CommandReply, HsmError> {
    let mut cursor = FieldCursor::new(body);

    let key_type = KeyType::from_short_code(cursor.take_str(2, "key type")?)?;

    // Requests from older hosts carry a key length flag between the
    // type code and the scheme tag; it is redundant with the tag and
    // skipped when present.
    let mut scheme_tag = cursor.take_char("key scheme")?;
    if scheme_tag.is_ascii_digit() {
        scheme_tag = cursor.take_char("key scheme")?;
    }
    let scheme = KeyScheme::from_tag(scheme_tag)?;
    if scheme != KeyScheme::Double && scheme != KeyScheme::Triple {
        return Err(HsmError::InvalidKeyScheme(scheme_tag));
    }

    let wrapped = cursor.take_hex(scheme.hex_len(), "key")?;
    let clear_key = ctx.engine().decrypt_under_lmk(&wrapped, key_type, scheme)?;

    // BU reports a parity failure as a verification failure rather
    // than the usual parity code.
    if !check_key_parity(&clear_key) {
        return Err(HsmError::VerificationFailed);
    }

    let check = kcv(&clear_key, 16)?;
    Ok(CommandReply::ok(check.into_bytes()))
}
