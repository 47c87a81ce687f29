//! NC / B2 — diagnostics and echo.

use super::{CommandContext, CommandReply};
use crate::command::FieldCursor;
use crate::error::HsmError;

const MIN_FIRMWARE_LEN: usize = 9;

/// NC: report the LMK check value and echo the firmware identifier.
pub fn handle_diagnostics(body: &[u8], ctx: &CommandContext) -> Result<CommandReply, HsmError> {
    if body.len() < MIN_FIRMWARE_LEN {
        return Err(HsmError::InvalidInput("firmware identifier"));
    }

    let check = ctx.engine().check_value()?;
    let mut payload = check.into_bytes();
    payload.extend_from_slice(body);
    Ok(CommandReply::ok(payload))
}

/// B2: echo back the declared number of bytes.
pub fn handle_echo(body: &[u8], _ctx: &CommandContext) -> Result<CommandReply, HsmError> {
    let mut cursor = FieldCursor::new(body);

    let length_str = cursor.take_str(4, "data length")?;
    let length = usize::from_str_radix(length_str, 16)
        .map_err(|_| HsmError::InvalidInput("data length"))?;
    let data = cursor.take(length, "echo data")?;

    Ok(CommandReply::ok(data.to_vec()))
}
