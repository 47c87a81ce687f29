//! CA — translate a PIN block between keys and formats.
//!
//! The PIN block arrives encrypted under a terminal PIN key; it is
//! decrypted, decoded from the source format, re-encoded into the
//! destination format and encrypted under the destination key. The
//! destination key type defaults to ZPK and can be redirected by the
//! `*` (BDK) or `~` (interchange ZPK) flag before the destination key
//! field.
//!
//! Trailing context fields, in order: the 12-digit account number
//! (always present), a 9-digit pad when either format is Docutel, a
//! 16-hex UDK when either format is a Visa new-PIN format, and the old
//! PIN when either format is the new-and-old format.

use zeroize::Zeroizing;

use super::{CommandContext, CommandReply};
use crate::command::FieldCursor;
use crate::crypto::{check_key_parity, tdes_dec_ecb, tdes_enc_ecb};
use crate::error::HsmError;
use crate::lmk::{KeyScheme, KeyType};
use crate::pin::{decode_pin_block, encode_pin_block, PinBlockFormat, PinContext};

struct TrailingFields<'a> {
    account: &'a str,
    pad: Option<&'a str>,
    udk: Option<&'a str>,
    old_pin: Option<&'a str>,
}

fn needs_pad(format: PinBlockFormat) -> bool {
    format == PinBlockFormat::Docutel
}

fn needs_udk(format: PinBlockFormat) -> bool {
    matches!(
        format,
        PinBlockFormat::VisaNewPinOnly | PinBlockFormat::VisaNewOldPin
    )
}

fn parse_trailing<'a>(
    cursor: &mut FieldCursor<'a>,
    source: PinBlockFormat,
    dest: PinBlockFormat,
) -> Result<TrailingFields<'a>, HsmError> {
    let account = cursor.take_digits(12, "account number")?;

    let pad = if needs_pad(source) || needs_pad(dest) {
        Some(cursor.take_digits(9, "Docutel pad")?)
    } else {
        None
    };
    let udk = if needs_udk(source) || needs_udk(dest) {
        Some(cursor.take_str(16, "derivation key")?)
    } else {
        None
    };
    let old_pin = if source == PinBlockFormat::VisaNewOldPin || dest == PinBlockFormat::VisaNewOldPin
    {
        let rest = cursor.rest();
        let text = std::str::from_utf8(rest)
            .map_err(|_| HsmError::InvalidInput("old PIN"))?;
        Some(text)
    } else {
        None
    };

    Ok(TrailingFields {
        account,
        pad,
        udk,
        old_pin,
    })
}

fn context_for<'a>(
    format: PinBlockFormat,
    fields: &TrailingFields<'a>,
) -> Result<PinContext<'a>, HsmError> {
    if format.uses_pan() {
        return Ok(PinContext::Pan(fields.account));
    }
    match format {
        PinBlockFormat::Docutel => fields
            .pad
            .map(PinContext::NumericPad)
            .ok_or(HsmError::InvalidInput("Docutel pad")),
        PinBlockFormat::VisaNewPinOnly => fields
            .udk
            .map(PinContext::Udk)
            .ok_or(HsmError::InvalidInput("derivation key")),
        PinBlockFormat::VisaNewOldPin => match (fields.old_pin, fields.udk) {
            (Some(old_pin), Some(udk)) => Ok(PinContext::OldPinUdk { old_pin, udk }),
            _ => Err(HsmError::InvalidInput("old PIN")),
        },
        _ => Ok(PinContext::None),
    }
}

pub fn handle(body: &[u8], ctx: &CommandContext) -> Result<CommandReply, HsmError> {
    let mut cursor = FieldCursor::new(body);

    let source_key = cursor.take_key_field(KeyScheme::PairedSingle, "source key")?;

    let dest_type = if cursor.skip_if(b'*') {
        KeyType::BDK
    } else if cursor.skip_if(b'~') {
        KeyType::ZPK_INTERCHANGE
    } else {
        KeyType::ZPK
    };
    let dest_key = cursor.take_key_field(KeyScheme::PairedSingle, "destination key")?;

    let pin_block = cursor.take_hex(16, "PIN block")?;
    let source_format = PinBlockFormat::from_wire_code(cursor.take_str(2, "source format")?)?;
    let dest_format = PinBlockFormat::from_wire_code(cursor.take_str(2, "destination format")?)?;
    let trailing = parse_trailing(&mut cursor, source_format, dest_format)?;

    let engine = ctx.engine_for_scheme(source_key.scheme)?;
    let clear_source = engine.decrypt_under_lmk(&source_key.wrapped, KeyType::TPK, source_key.scheme)?;
    if !check_key_parity(&clear_source) {
        return Err(HsmError::KeyParity);
    }

    let dest_engine = ctx.engine_for_scheme(dest_key.scheme)?;
    let clear_dest = dest_engine.decrypt_under_lmk(&dest_key.wrapped, dest_type, dest_key.scheme)?;
    if !check_key_parity(&clear_dest) {
        return Err(HsmError::KeyParity);
    }

    let clear_block = Zeroizing::new(tdes_dec_ecb(&pin_block, &clear_source)?);
    let block: &[u8; 8] = clear_block
        .as_slice()
        .try_into()
        .expect("16 hex chars make one block");

    let source_ctx = context_for(source_format, &trailing)?;
    let pin = Zeroizing::new(decode_pin_block(source_format, block, source_ctx)?);

    let dest_ctx = context_for(dest_format, &trailing)?;
    let new_block = encode_pin_block(dest_format, &pin, dest_ctx)?;
    let encrypted = tdes_enc_ecb(&new_block, &clear_dest)?;

    let mut payload = format!("{:02}", pin.len()).into_bytes();
    payload.extend_from_slice(hex::encode_upper(encrypted).as_bytes());
    payload.extend_from_slice(
        dest_format
            .wire_code()
            .expect("wire formats always carry a code")
            .as_bytes(),
    );
    Ok(CommandReply::ok(payload))
}
