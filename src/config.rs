//! LMK configuration.
//!
//! The variant LMK set is loaded from a text file of 40 lines, one
//! 16-hex-character subkey per line; the AES key-block LMK from a
//! single line of 32, 48 or 64 hex characters. Blank lines and `#`
//! comments are ignored. When no file is given, the engines start from
//! the embedded defaults: the well-known test LMK set every Thales
//! test bench ships with, and a fixed test AES-256 key. Production
//! deployments are expected to point both loaders at real key
//! material.

use std::fs;
use std::path::Path;

use zeroize::Zeroizing;

use crate::error::HsmError;
use crate::lmk::{KeyBlockLmk, VariantLmk, VARIANT_LMK_SUBKEYS};

/// The standard test variant LMK set.
pub const DEFAULT_VARIANT_LMK: &str = "\
0101010101010101
7902CD1FD36EF8BA
2020202020202020
3131313131313131
4040404040404040
5151515151515151
6161616161616161
7070707070707070
8080808080808080
9191919191919191
A1A1A1A1A1A1A1A1
B0B0B0B0B0B0B0B0
C1C1010101010101
D0D0010101010101
E0E0010101010101
F1F1010101010101
1C587F1C13924FEF
0101010101010101
0101010101010101
0101010101010101
0202020202020202
0404040404040404
0606060606060606
0808080808080808
1010101010101010
1212121212121212
1414141414141414
1616161616161616
1818181818181818
1A1A1A1A1A1A1A1A
1C1C1C1C1C1C1C1C
1E1E1E1E1E1E1E1E
2020202020202020
2222222222222222
2424242424242424
2626262626262626
2828282828282828
2A2A2A2A2A2A2A2A
2C2C2C2C2C2C2C2C
2E2E2E2E2E2E2E2E
";

/// The test AES-256 key-block LMK.
pub const DEFAULT_KEY_BLOCK_LMK: &str =
    "88E1AB2A2E3DD38C1FA039A536500CC8A87AB9D62DC92C01058FA79F44657DE6";

fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Parse a variant LMK set from its 40-line text form.
pub fn parse_variant_lmk(text: &str) -> Result<VariantLmk, HsmError> {
    let mut subkeys = Vec::with_capacity(VARIANT_LMK_SUBKEYS);
    for line in content_lines(text) {
        if line.len() != 16 {
            return Err(HsmError::LmkFailure(format!(
                "variant LMK line must be 16 hex characters, got {}",
                line.len()
            )));
        }
        let bytes = hex::decode(line)
            .map_err(|_| HsmError::LmkFailure("variant LMK line is not hex".to_string()))?;
        subkeys.push(bytes.try_into().expect("16 hex chars make 8 bytes"));
    }
    VariantLmk::new(subkeys)
}

/// Parse an AES key-block LMK from its single-line hex form.
pub fn parse_key_block_lmk(text: &str) -> Result<KeyBlockLmk, HsmError> {
    let line = content_lines(text)
        .next()
        .ok_or_else(|| HsmError::LmkFailure("key block LMK file is empty".to_string()))?;
    if !matches!(line.len(), 32 | 48 | 64) {
        return Err(HsmError::LmkFailure(format!(
            "key block LMK must be 32, 48 or 64 hex characters, got {}",
            line.len()
        )));
    }
    let key = Zeroizing::new(
        hex::decode(line)
            .map_err(|_| HsmError::LmkFailure("key block LMK is not hex".to_string()))?,
    );
    KeyBlockLmk::new(&key)
}

/// Load the variant LMK set from a file, or the embedded default.
pub fn load_variant_lmk(path: Option<&Path>) -> Result<VariantLmk, HsmError> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| {
                HsmError::LmkFailure(format!("cannot read {}: {}", path.display(), e))
            })?;
            parse_variant_lmk(&text)
        }
        None => parse_variant_lmk(DEFAULT_VARIANT_LMK),
    }
}

/// Load the AES key-block LMK from a file, or the embedded default.
pub fn load_key_block_lmk(path: Option<&Path>) -> Result<KeyBlockLmk, HsmError> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| {
                HsmError::LmkFailure(format!("cannot read {}: {}", path.display(), e))
            })?;
            parse_key_block_lmk(&text)
        }
        None => parse_key_block_lmk(DEFAULT_KEY_BLOCK_LMK),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lmk::{KeyScheme, KeyType, LmkProvider};

    #[test]
    fn test_default_variant_lmk_parses_and_roundtrips() {
        let lmk = parse_variant_lmk(DEFAULT_VARIANT_LMK).unwrap();
        let clear = hex::decode("0123456789ABCDEFFEDCBA9876543210").unwrap();
        let wrapped = lmk
            .encrypt_under_lmk(&clear, KeyType::ZPK, KeyScheme::Double)
            .unwrap();
        let unwrapped = lmk
            .decrypt_under_lmk(&wrapped, KeyType::ZPK, KeyScheme::Double)
            .unwrap();
        assert_eq!(unwrapped.as_slice(), clear.as_slice());
    }

    #[test]
    fn test_default_key_block_lmk_parses() {
        let lmk = parse_key_block_lmk(DEFAULT_KEY_BLOCK_LMK).unwrap();
        assert_eq!(lmk.check_value().unwrap().len(), 16);
    }

    #[test]
    fn test_variant_lmk_validation() {
        assert!(parse_variant_lmk("0101\n").is_err());
        assert!(parse_variant_lmk("XX01010101010101\n").is_err());
        // 39 subkeys only.
        let short: String = DEFAULT_VARIANT_LMK.lines().take(39).collect::<Vec<_>>().join("\n");
        assert!(parse_variant_lmk(&short).is_err());
    }

    #[test]
    fn test_key_block_lmk_validation() {
        assert!(parse_key_block_lmk("").is_err());
        assert!(parse_key_block_lmk("0123").is_err());
        assert!(parse_key_block_lmk(&"G".repeat(64)).is_err());
        assert!(parse_key_block_lmk(&"0".repeat(32)).is_ok());
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let text = format!("# test LMK\n\n{}", DEFAULT_VARIANT_LMK);
        assert!(parse_variant_lmk(&text).is_ok());
    }
}
