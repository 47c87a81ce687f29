//! EMV application cryptograms.
//!
//! ARQC generation and ARPC responses for the Visa cryptogram versions
//! handled by the engine. CVN 10 MACs the transaction data directly
//! under the card key with zero padding; CVN 18 and 22 derive an ICC
//! master key from the issuer master key and a common session key from
//! the ATC, and MAC ISO 7816-4 padded data. The two session-key versions
//! share their ARQC construction and differ downstream in issuer
//! response handling, so both surface here with the method-2 ARPC.

use zeroize::Zeroizing;

use super::derivation::{derive_common_session_key, derive_icc_mk_a, derive_icc_mk_b};
use crate::crypto::tdes::{retail_mac, tdes_enc_ecb, DES_BLOCK_LEN};
use crate::error::HsmError;
use crate::utils::xor_byte_arrays;

/// Supported issuer master key diversification options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImkDerivation {
    /// EMV Option A, PANs up to 16 digits.
    OptionA,
    /// EMV Option B, long PANs hashed to a 16-digit proxy.
    OptionB,
    /// Proprietary Option C, not supported by this engine.
    OptionC,
}

/// Derive an ICC master key with an explicit diversification option.
pub fn derive_icc_mk(
    option: ImkDerivation,
    imk: &[u8],
    pan: &str,
    psn: &str,
) -> Result<Zeroizing<Vec<u8>>, HsmError> {
    match option {
        ImkDerivation::OptionA => derive_icc_mk_a(imk, pan, psn),
        ImkDerivation::OptionB => derive_icc_mk_b(imk, pan, psn),
        ImkDerivation::OptionC => Err(HsmError::CryptoFailure(
            "ICC master key derivation option C is not supported".to_string(),
        )),
    }
}

fn zero_pad(data: &[u8]) -> Result<Vec<u8>, HsmError> {
    if data.is_empty() {
        return Err(HsmError::CryptoFailure(
            "cryptogram input data is empty".to_string(),
        ));
    }
    let mut padded = data.to_vec();
    while padded.len() % DES_BLOCK_LEN != 0 {
        padded.push(0x00);
    }
    Ok(padded)
}

fn iso7816_pad(data: &[u8]) -> Result<Vec<u8>, HsmError> {
    if data.is_empty() {
        return Err(HsmError::CryptoFailure(
            "cryptogram input data is empty".to_string(),
        ));
    }
    let mut padded = data.to_vec();
    if padded.len() % DES_BLOCK_LEN != 0 {
        padded.push(0x80);
        while padded.len() % DES_BLOCK_LEN != 0 {
            padded.push(0x00);
        }
    }
    Ok(padded)
}

/// Generate a CVN 10 ARQC.
///
/// The MK-AC itself is the MAC key; the transaction data is zero padded
/// to the block size and run through the retail MAC. CVN 10 applies no
/// per-transaction key diversification, so the PAN and PSN do not enter
/// the computation.
///
/// # Parameters
///
/// * `mkac`: 16-byte application cryptogram master key.
/// * `txn_data`: Transaction data assembled by the caller.
///
/// # Returns
///
/// * `Ok([u8; 8])` - The ARQC.
/// * `Err(HsmError)` - If the key is not double length or the data is
///   empty.
pub fn generate_arqc10(
    mkac: &[u8],
    txn_data: &[u8],
    _pan: &str,
    _psn: &str,
) -> Result<[u8; 8], HsmError> {
    if mkac.len() != 16 {
        return Err(HsmError::KeyNotDoubleLength);
    }
    let padded = zero_pad(txn_data)?;
    retail_mac(mkac, &padded)
}

/// Generate a CVN 18 ARQC.
///
/// An ICC master key is derived from the issuer master key (Option A,
/// Option B for long PANs), a common session key from the ATC, and the
/// ISO 7816-4 padded transaction data is run through the retail MAC
/// under the session key.
pub fn generate_arqc18(
    mkac: &[u8],
    txn_data: &[u8],
    pan: &str,
    psn: &str,
    atc: &[u8; 2],
) -> Result<[u8; 8], HsmError> {
    let option = if pan.len() > 16 {
        ImkDerivation::OptionB
    } else {
        ImkDerivation::OptionA
    };
    let icc_mk = derive_icc_mk(option, mkac, pan, psn)?;
    let session_key = derive_common_session_key(&icc_mk, atc)?;
    let padded = iso7816_pad(txn_data)?;
    retail_mac(&session_key, &padded)
}

/// Generate a CVN 22 ARQC. The request cryptogram construction is the
/// CVN 18 one; the versions diverge in issuer response processing.
pub fn generate_arqc22(
    mkac: &[u8],
    txn_data: &[u8],
    pan: &str,
    psn: &str,
    atc: &[u8; 2],
) -> Result<[u8; 8], HsmError> {
    generate_arqc18(mkac, txn_data, pan, psn, atc)
}

/// Generate a CVN 10 ARPC (response method 1).
///
/// The 2-byte authorisation response code is left-justified into a zero
/// block, XORed with the ARQC and encrypted with 3DES under the MK-AC.
pub fn generate_arpc10(
    mkac: &[u8],
    arqc: &[u8],
    arc: &[u8],
    _pan: &str,
    _psn: &str,
) -> Result<[u8; 8], HsmError> {
    if mkac.len() != 16 {
        return Err(HsmError::KeyNotDoubleLength);
    }
    if arqc.len() != 8 {
        return Err(HsmError::CryptoFailure("ARQC must be 8 bytes".to_string()));
    }
    if arc.len() != 2 {
        return Err(HsmError::CryptoFailure(
            "authorisation response code must be 2 bytes".to_string(),
        ));
    }

    let mut arc_block = [0u8; 8];
    arc_block[..2].copy_from_slice(arc);
    let mixed = xor_byte_arrays(arqc, &arc_block)?;
    let ciphertext = tdes_enc_ecb(&mixed, mkac)?;

    let mut arpc = [0u8; 8];
    arpc.copy_from_slice(&ciphertext);
    Ok(arpc)
}

/// Generate a CVN 18/22 ARPC (response method 2).
///
/// The retail MAC of ARQC ‖ CSU ‖ optional proprietary data, ISO 7816-4
/// padded, under the common session key, truncated to 4 bytes.
pub fn generate_arpc18(
    mkac: &[u8],
    arqc: &[u8],
    csu: &[u8],
    prop_data: &[u8],
    pan: &str,
    psn: &str,
    atc: &[u8; 2],
) -> Result<[u8; 4], HsmError> {
    if arqc.len() != 8 {
        return Err(HsmError::CryptoFailure("ARQC must be 8 bytes".to_string()));
    }
    if csu.len() != 4 {
        return Err(HsmError::CryptoFailure(
            "card status update must be 4 bytes".to_string(),
        ));
    }

    let option = if pan.len() > 16 {
        ImkDerivation::OptionB
    } else {
        ImkDerivation::OptionA
    };
    let icc_mk = derive_icc_mk(option, mkac, pan, psn)?;
    let session_key = derive_common_session_key(&icc_mk, atc)?;

    let mut message = Vec::with_capacity(8 + 4 + prop_data.len());
    message.extend_from_slice(arqc);
    message.extend_from_slice(csu);
    message.extend_from_slice(prop_data);
    let padded = iso7816_pad(&message)?;

    let mac = retail_mac(&session_key, &padded)?;
    let mut arpc = [0u8; 4];
    arpc.copy_from_slice(&mac[..4]);
    Ok(arpc)
}
