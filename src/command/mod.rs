//! The command engine.
//!
//! One handler per Thales command code. Every handler follows the same
//! shape: validate and parse the fields by declared widths, orchestrate
//! the LMK provider and the crypto primitives, and assemble the reply
//! payload. The dispatcher owns reply-code synthesis (the second letter
//! of the request code incremented) and the single point where an
//! [`HsmError`] kind becomes a two-digit wire code.

mod card_verification;
mod cryptogram;
mod diagnostics;
mod fields;
mod generate_key;
mod key_check_value;
mod rotate_key;
mod translate_pin;
mod translate_zpk;
mod verify_pin;

pub use fields::{FieldCursor, KeyField};

use crate::error::HsmError;
use crate::lmk::{KeyScheme, LmkProvider, LmkRegistry};

/// Registry id of the variant LMK engine commands use by default.
pub const VARIANT_ENGINE_ID: &str = "00";
/// Registry id of the AES key-block engine.
pub const KEY_BLOCK_ENGINE_ID: &str = "01";

/// Read-only state a handler works against.
pub struct CommandContext<'a> {
    registry: &'a LmkRegistry,
}

impl<'a> CommandContext<'a> {
    pub fn new(registry: &'a LmkRegistry) -> Self {
        CommandContext { registry }
    }

    /// The default LMK engine.
    pub fn engine(&self) -> &dyn LmkProvider {
        self.registry.default_engine()
    }

    /// Look up an engine by registry id.
    pub fn engine_by_id(&self, id: &str) -> Result<&dyn LmkProvider, HsmError> {
        self.registry.get(id)
    }

    /// The engine responsible for keys of the given scheme: key blocks
    /// route to the AES engine, everything else to the default.
    pub fn engine_for_scheme(&self, scheme: KeyScheme) -> Result<&dyn LmkProvider, HsmError> {
        if scheme == KeyScheme::KeyBlock {
            self.registry.get(KEY_BLOCK_ENGINE_ID)
        } else {
            Ok(self.registry.default_engine())
        }
    }
}

/// A successful handler result: the two-digit status for the reply
/// (almost always `00`; FA reports its parity advice here) and the
/// payload fields.
pub struct CommandReply {
    status: &'static str,
    payload: Vec<u8>,
}

impl CommandReply {
    /// A success reply with payload.
    pub fn ok(payload: Vec<u8>) -> Self {
        CommandReply {
            status: "00",
            payload,
        }
    }

    /// A success reply with an explicit status value.
    pub fn with_status(status: &'static str, payload: Vec<u8>) -> Self {
        CommandReply { status, payload }
    }
}

type Handler = fn(&[u8], &CommandContext) -> Result<CommandReply, HsmError>;

const HANDLERS: [(&[u8; 2], Handler); 12] = [
    (b"A0", generate_key::handle),
    (b"B2", diagnostics::handle_echo),
    (b"BU", key_check_value::handle),
    (b"CA", translate_pin::handle),
    (b"CW", card_verification::handle_generate),
    (b"CY", card_verification::handle_verify),
    (b"DC", verify_pin::handle_tpk),
    (b"EC", verify_pin::handle_zpk),
    (b"FA", translate_zpk::handle),
    (b"HC", rotate_key::handle),
    (b"KQ", cryptogram::handle),
    (b"NC", diagnostics::handle_diagnostics),
];

/// Reply code for a request code: the second letter incremented.
pub fn reply_code(code: &[u8; 2]) -> [u8; 2] {
    [code[0], code[1] + 1]
}

/// Process one framed message body (command code plus fields) and
/// produce the reply body.
pub fn dispatch(message: &[u8], registry: &LmkRegistry) -> Vec<u8> {
    if message.len() < 2 {
        log::warn!("dropping message shorter than a command code");
        return b"ZZ15".to_vec();
    }

    let code: &[u8; 2] = message[..2].try_into().expect("length checked");
    let body = &message[2..];
    let reply = reply_code(code);
    let code_str = String::from_utf8_lossy(code);

    let handler = HANDLERS
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, handler)| handler);

    let mut response = Vec::with_capacity(64);
    response.extend_from_slice(&reply);
    match handler {
        Some(handler) => {
            let ctx = CommandContext::new(registry);
            match handler(body, &ctx) {
                Ok(cmd_reply) => {
                    log::debug!("command {} completed", code_str);
                    response.extend_from_slice(cmd_reply.status.as_bytes());
                    response.extend_from_slice(&cmd_reply.payload);
                }
                Err(error) => {
                    log::warn!("command {} failed: {}", code_str, error);
                    response.extend_from_slice(error.wire_code().as_bytes());
                }
            }
        }
        None => {
            log::warn!("unknown command code {}", code_str);
            response.extend_from_slice(b"68");
        }
    }
    response
}

#[cfg(test)]
mod tests;
