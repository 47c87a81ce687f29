//! KQ — verify an ARQC and generate the ARPC response.
//!
//! The one command whose body mixes binary and ASCII fields, so every
//! field is consumed by its declared byte width. Mode 0 verifies the
//! request cryptogram, mode 1 verifies it and produces the response
//! cryptogram, mode 2 only produces the response.

use subtle::ConstantTimeEq;

use super::{CommandContext, CommandReply};
use crate::command::FieldCursor;
use crate::crypto::check_key_parity;
use crate::crypto::emv::{generate_arpc10, generate_arqc10};
use crate::error::HsmError;
use crate::lmk::{KeyScheme, KeyType};

const MAX_TXN_DATA_LEN: usize = 252;

pub fn handle(body: &[u8], ctx: &CommandContext) -> Result<CommandReply, HsmError> {
    let mut cursor = FieldCursor::new(body);

    let mode = cursor.take_char("mode")?;
    if !matches!(mode, '0' | '1' | '2') {
        return Err(HsmError::LmkFailure(format!(
            "unsupported cryptogram mode {}",
            mode
        )));
    }
    let scheme_id = cursor.take_char("derivation scheme")?;
    if scheme_id != '0' {
        return Err(HsmError::LmkFailure(format!(
            "unsupported derivation scheme {}",
            scheme_id
        )));
    }

    let mkac_field = cursor.take_key_field(KeyScheme::PairedSingle, "MK-AC")?;
    let engine = ctx.engine_for_scheme(mkac_field.scheme)?;
    let mkac = engine.decrypt_under_lmk(&mkac_field.wrapped, KeyType::MK_AC, mkac_field.scheme)?;
    if !check_key_parity(&mkac) {
        return Err(HsmError::KeyParity);
    }
    if mkac.len() != 16 {
        return Err(HsmError::KeyNotDoubleLength);
    }

    let pan_psn = cursor.take(8, "PAN and PSN")?;
    let pan = hex::encode_upper(&pan_psn[..7]);
    let psn = hex::encode_upper(&pan_psn[7..]);
    let _atc = cursor.take(2, "ATC")?;
    let _un = cursor.take(4, "unpredictable number")?;

    let txn_len_str = cursor.take_str(2, "transaction data length")?;
    let txn_len = usize::from_str_radix(txn_len_str, 16)
        .map_err(|_| HsmError::InvalidInput("transaction data length"))?;
    if txn_len == 0 || txn_len > MAX_TXN_DATA_LEN {
        return Err(HsmError::InvalidTransactionData(txn_len));
    }
    let txn_data = cursor.take(txn_len, "transaction data")?;

    let delimiter = cursor.take_char("delimiter")?;
    if delimiter != ';' {
        return Err(HsmError::InvalidInput("delimiter"));
    }
    let arqc = cursor.take(8, "ARQC")?;

    if mode == '0' || mode == '1' {
        let expected = generate_arqc10(&mkac, txn_data, &pan, &psn)?;
        if !bool::from(expected[..].ct_eq(arqc)) {
            return Err(HsmError::VerificationFailed);
        }
    }

    let mut payload = Vec::new();
    if mode == '1' || mode == '2' {
        let arc = cursor.take(2, "authorisation response code")?;
        let arpc = generate_arpc10(&mkac, arqc, arc, &pan, &psn)?;
        payload.extend_from_slice(hex::encode_upper(arpc).as_bytes());
    }

    Ok(CommandReply::ok(payload))
}
