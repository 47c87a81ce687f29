//! The AES key-block LMK engine.
//!
//! Working keys are stored as printable key-block records: a fixed
//! ASCII header describing the key, the AES-CBC ciphertext of the key
//! payload, and an AES-CMAC over header and payload. Encryption and
//! authentication use subkeys (KBPK for confidentiality, KBAK for the
//! MAC) derived from the master AES LMK with CMAC as the pseudorandom
//! function; the MAC doubles as the CBC initialisation vector, binding
//! ciphertext and header together. The MAC check on unwrap is constant
//! time.

use soft_aes::aes::{aes_cmac, aes_dec_cbc, aes_enc_cbc};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::key_type::KeyType;
use super::provider::LmkProvider;
use super::scheme::KeyScheme;
use crate::crypto::tdes_enc_ecb;
use crate::error::HsmError;

const AES_BLOCK_LEN: usize = 16;
const MAC_LEN: usize = 16;
const HEADER_LEN: usize = 12;

// Derivation inputs for the key-block subkeys, one CMAC block each.
// Two blocks cover LMKs wider than a single CMAC output.
const KDI_KBPK_1: &[u8; 16] = b"PAYHSM-KBPK-0001";
const KDI_KBPK_2: &[u8; 16] = b"PAYHSM-KBPK-0002";
const KDI_KBAK_1: &[u8; 16] = b"PAYHSM-KBAK-0001";
const KDI_KBAK_2: &[u8; 16] = b"PAYHSM-KBAK-0002";

/// Fixed header of a wrapped key: all fields ASCII, 12 bytes total.
///
/// Layout: version (1) ‖ key usage (2) ‖ algorithm (1) ‖ mode of use
/// (1) ‖ key version (2) ‖ exportability (1) ‖ optional block count
/// (2) ‖ context (2). The context carries the short form of the key
/// type so that unwrapping under a different type fails the header
/// check before any cryptography runs.
#[derive(Debug, PartialEq, Eq)]
pub struct KeyBlockHeader {
    version: char,
    key_usage: String,
    algorithm: char,
    mode_of_use: char,
    key_version: String,
    exportability: char,
    context: String,
}

impl KeyBlockHeader {
    const ALLOWED_VERSIONS: [char; 1] = ['1'];
    const ALLOWED_ALGORITHMS: [char; 2] = ['T', 'A'];
    const ALLOWED_MODES_OF_USE: [char; 5] = ['B', 'E', 'D', 'G', 'V'];
    const ALLOWED_EXPORTABILITIES: [char; 2] = ['E', 'N'];

    /// Build the header for a working key of the given type.
    pub fn for_key_type(key_type: KeyType) -> Self {
        let code = key_type.code();
        let bytes = code.as_bytes();
        KeyBlockHeader {
            version: '1',
            key_usage: usage_for_type(key_type).to_string(),
            algorithm: 'T',
            mode_of_use: 'B',
            key_version: "00".to_string(),
            exportability: 'N',
            context: format!("{}{}", bytes[0] as char, bytes[2] as char),
        }
    }

    /// Parse and validate the 12-byte ASCII header of a key block.
    pub fn from_str(header: &str) -> Result<Self, HsmError> {
        if header.len() < HEADER_LEN || !header.is_ascii() {
            return Err(HsmError::LmkFailure(
                "key block header is truncated".to_string(),
            ));
        }

        let version = header.as_bytes()[0] as char;
        if !Self::ALLOWED_VERSIONS.contains(&version) {
            return Err(HsmError::LmkFailure(format!(
                "unsupported key block version {}",
                version
            )));
        }
        let algorithm = header.as_bytes()[3] as char;
        if !Self::ALLOWED_ALGORITHMS.contains(&algorithm) {
            return Err(HsmError::LmkFailure(format!(
                "unsupported key block algorithm {}",
                algorithm
            )));
        }
        let mode_of_use = header.as_bytes()[4] as char;
        if !Self::ALLOWED_MODES_OF_USE.contains(&mode_of_use) {
            return Err(HsmError::LmkFailure(format!(
                "unsupported key block mode of use {}",
                mode_of_use
            )));
        }
        let exportability = header.as_bytes()[7] as char;
        if !Self::ALLOWED_EXPORTABILITIES.contains(&exportability) {
            return Err(HsmError::LmkFailure(format!(
                "unsupported key block exportability {}",
                exportability
            )));
        }
        if &header[8..10] != "00" {
            return Err(HsmError::LmkFailure(
                "optional key block fields are not supported".to_string(),
            ));
        }

        Ok(KeyBlockHeader {
            version,
            key_usage: header[1..3].to_string(),
            algorithm,
            mode_of_use,
            key_version: header[5..7].to_string(),
            exportability,
            context: header[10..12].to_string(),
        })
    }

    /// Export the fixed 12-byte ASCII form.
    pub fn export_str(&self) -> String {
        format!(
            "{}{}{}{}{}{}00{}",
            self.version,
            self.key_usage,
            self.algorithm,
            self.mode_of_use,
            self.key_version,
            self.exportability,
            self.context
        )
    }

    /// The key-type context carried by the header.
    pub fn context(&self) -> &str {
        &self.context
    }
}

/// Key usage tag for the header, by key type.
fn usage_for_type(key_type: KeyType) -> &'static str {
    if key_type == KeyType::ZMK {
        "K0"
    } else if key_type == KeyType::ZPK || key_type == KeyType::ZPK_INTERCHANGE {
        "P0"
    } else if key_type == KeyType::TPK {
        "P1"
    } else if key_type == KeyType::MK_AC {
        "E0"
    } else if key_type == KeyType::CVK {
        "C0"
    } else {
        "D0"
    }
}

/// The AES key-block LMK engine.
pub struct KeyBlockLmk {
    lmk: Zeroizing<Vec<u8>>,
}

impl KeyBlockLmk {
    /// Build an engine from the master AES key (16, 24 or 32 bytes).
    pub fn new(lmk: &[u8]) -> Result<Self, HsmError> {
        if !matches!(lmk.len(), 16 | 24 | 32) {
            return Err(HsmError::LmkFailure(format!(
                "invalid AES LMK length {}",
                lmk.len()
            )));
        }
        Ok(KeyBlockLmk {
            lmk: Zeroizing::new(lmk.to_vec()),
        })
    }

    /// Derive the encryption and authentication subkeys from the
    /// master key. The derived keys match the master key width.
    fn derive_subkeys(&self) -> Result<(Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>), HsmError> {
        let cmac = |input: &[u8]| -> Result<Vec<u8>, HsmError> {
            aes_cmac(input, &self.lmk)
                .map(|mac| mac.to_vec())
                .map_err(|e| HsmError::LmkFailure(e.to_string()))
        };

        let (kbpk, kbak) = match self.lmk.len() {
            16 => (cmac(KDI_KBPK_1)?, cmac(KDI_KBAK_1)?),
            24 | 32 => {
                let mut enc = cmac(KDI_KBPK_1)?;
                enc.extend_from_slice(&cmac(KDI_KBPK_2)?);
                enc.truncate(self.lmk.len());
                let mut mac = cmac(KDI_KBAK_1)?;
                mac.extend_from_slice(&cmac(KDI_KBAK_2)?);
                mac.truncate(self.lmk.len());
                (enc, mac)
            }
            _ => unreachable!("constructor validates the LMK length"),
        };

        Ok((Zeroizing::new(kbpk), Zeroizing::new(kbak)))
    }
}

/// Assemble the confidential payload: a 2-byte big-endian bit length,
/// the key, and zero fill up to the cipher block size.
fn build_payload(clear_key: &[u8]) -> Zeroizing<Vec<u8>> {
    let raw_len = 2 + clear_key.len();
    let padded_len = raw_len.div_ceil(AES_BLOCK_LEN) * AES_BLOCK_LEN;

    let mut payload = Zeroizing::new(Vec::with_capacity(padded_len));
    payload.extend_from_slice(&((clear_key.len() * 8) as u16).to_be_bytes());
    payload.extend_from_slice(clear_key);
    payload.resize(padded_len, 0x00);
    payload
}

/// Extract the key from a decrypted payload, validating the length
/// field and the zero fill.
fn extract_key_from_payload(payload: &[u8]) -> Result<Zeroizing<Vec<u8>>, HsmError> {
    if payload.len() < 2 {
        return Err(HsmError::LmkFailure("key block payload too short".to_string()));
    }
    let bit_len = u16::from_be_bytes([payload[0], payload[1]]) as usize;
    if bit_len % 8 != 0 || 2 + bit_len / 8 > payload.len() {
        return Err(HsmError::LmkFailure(
            "key block payload length field is invalid".to_string(),
        ));
    }
    let key_len = bit_len / 8;
    if payload[2 + key_len..].iter().any(|&b| b != 0) {
        return Err(HsmError::LmkFailure(
            "key block payload fill is invalid".to_string(),
        ));
    }
    Ok(Zeroizing::new(payload[2..2 + key_len].to_vec()))
}

impl LmkProvider for KeyBlockLmk {
    fn encrypt_under_lmk(
        &self,
        clear_key: &[u8],
        key_type: KeyType,
        scheme: KeyScheme,
    ) -> Result<Vec<u8>, HsmError> {
        if scheme != KeyScheme::KeyBlock {
            return Err(HsmError::LmkFailure(
                "the key block engine only wraps key block schemes".to_string(),
            ));
        }
        if !matches!(clear_key.len(), 8 | 16 | 24) {
            return Err(HsmError::LmkFailure(format!(
                "invalid clear key length {}",
                clear_key.len()
            )));
        }

        let (kbpk, kbak) = self.derive_subkeys()?;
        let header = KeyBlockHeader::for_key_type(key_type).export_str();
        let payload = build_payload(clear_key);

        let mut mac_input = header.as_bytes().to_vec();
        mac_input.extend_from_slice(&payload);
        let mac = aes_cmac(&mac_input, &kbak).map_err(|e| HsmError::LmkFailure(e.to_string()))?;

        let iv: [u8; MAC_LEN] = mac[..MAC_LEN]
            .try_into()
            .expect("CMAC output is one cipher block");
        let ciphertext = aes_enc_cbc(&payload, &kbpk, &iv, None)
            .map_err(|e| HsmError::LmkFailure(e.to_string()))?;

        let record = format!(
            "{}{}{}",
            header,
            hex::encode_upper(&ciphertext),
            hex::encode_upper(mac)
        );
        Ok(record.into_bytes())
    }

    fn decrypt_under_lmk(
        &self,
        encrypted_key: &[u8],
        key_type: KeyType,
        scheme: KeyScheme,
    ) -> Result<Zeroizing<Vec<u8>>, HsmError> {
        if scheme != KeyScheme::KeyBlock {
            return Err(HsmError::LmkFailure(
                "the key block engine only unwraps key block schemes".to_string(),
            ));
        }
        let record = std::str::from_utf8(encrypted_key)
            .map_err(|_| HsmError::LmkFailure("key block is not ASCII".to_string()))?;
        if record.len() < HEADER_LEN + 2 * AES_BLOCK_LEN + 2 * MAC_LEN {
            return Err(HsmError::LmkFailure("key block is truncated".to_string()));
        }

        let header = KeyBlockHeader::from_str(record)?;
        let expected = KeyBlockHeader::for_key_type(key_type);
        if header.context() != expected.context() {
            return Err(HsmError::LmkFailure(
                "key block context does not match the requested key type".to_string(),
            ));
        }

        let mac_offset = record.len() - 2 * MAC_LEN;
        let ciphertext = hex::decode(&record[HEADER_LEN..mac_offset])
            .map_err(|_| HsmError::LmkFailure("key block ciphertext is not hex".to_string()))?;
        let mac = hex::decode(&record[mac_offset..])
            .map_err(|_| HsmError::LmkFailure("key block MAC is not hex".to_string()))?;

        let (kbpk, kbak) = self.derive_subkeys()?;
        let iv: [u8; MAC_LEN] = mac[..MAC_LEN]
            .try_into()
            .expect("MAC length checked above");
        let payload = Zeroizing::new(
            aes_dec_cbc(&ciphertext, &kbpk, &iv, None)
                .map_err(|e| HsmError::LmkFailure(e.to_string()))?,
        );

        let mut mac_input = record[..HEADER_LEN].as_bytes().to_vec();
        mac_input.extend_from_slice(&payload);
        let calculated =
            aes_cmac(&mac_input, &kbak).map_err(|e| HsmError::LmkFailure(e.to_string()))?;
        if !bool::from(calculated[..].ct_eq(&mac[..])) {
            return Err(HsmError::LmkFailure("key block MAC mismatch".to_string()));
        }

        extract_key_from_payload(&payload)
    }

    fn check_value(&self) -> Result<String, HsmError> {
        // The AES LMK identifies itself the same way the variant set
        // does: 3DES over the zero block with a 16-byte slice of the
        // master key, truncated to 16 hex characters.
        let ciphertext = tdes_enc_ecb(&[0u8; 16], &self.lmk[..16])?;
        let mut check = hex::encode_upper(ciphertext);
        check.truncate(16);
        Ok(check)
    }
}
