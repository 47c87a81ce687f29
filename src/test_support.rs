//! Deterministic fixtures shared by the engine tests.
//!
//! The test variant LMK replicates the well-known double-length test
//! key across all twenty pairs, so any key type decrypts under the same
//! 16 bytes (modulo variants) and test vectors stay readable. The test
//! key-block LMK is a fixed AES-256 key.

use std::sync::Arc;

use crate::lmk::{KeyBlockLmk, LmkRegistry, VariantLmk, VARIANT_LMK_SUBKEYS};

/// The double-length test key used throughout the command tests.
pub const TEST_LMK_HEX: &str = "0123456789ABCDEFFEDCBA9876543210";

/// Variant engine derived from the test key: pair 00-01 is the test
/// key itself, later pairs fold the pair number into the last subkey
/// byte so different key types wrap differently.
pub fn test_variant_lmk() -> VariantLmk {
    let left: [u8; 8] = hex::decode("0123456789ABCDEF").unwrap().try_into().unwrap();
    let right: [u8; 8] = hex::decode("FEDCBA9876543210").unwrap().try_into().unwrap();

    let mut subkeys = Vec::with_capacity(VARIANT_LMK_SUBKEYS);
    for index in 0..VARIANT_LMK_SUBKEYS {
        let mut subkey = if index % 2 == 0 { left } else { right };
        subkey[7] ^= (index / 2) as u8;
        subkeys.push(subkey);
    }
    VariantLmk::new(subkeys).unwrap()
}

/// Key-block engine with a fixed AES-256 master key.
pub fn test_key_block_lmk() -> KeyBlockLmk {
    let lmk =
        hex::decode("88E1AB2A2E3DD38C1FA039A536500CC8A87AB9D62DC92C01058FA79F44657DE6").unwrap();
    KeyBlockLmk::new(&lmk).unwrap()
}

/// Registry with the variant engine as default (`00`) and the key-block
/// engine as `01`.
pub fn test_registry() -> LmkRegistry {
    let mut registry = LmkRegistry::new("00", Arc::new(test_variant_lmk()));
    registry.register("01", Arc::new(test_key_block_lmk()));
    registry
}
