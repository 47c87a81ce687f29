mod test_dispatch;
mod test_generate_key;
mod test_rotate_key;
mod test_translate_zpk;

use crate::lmk::{KeyScheme, KeyType, LmkProvider};
use crate::test_support::{test_registry, test_variant_lmk};

/// Run one message (command code plus body) against the test LMKs.
pub(crate) fn run(message: &[u8]) -> Vec<u8> {
    let registry = test_registry();
    super::dispatch(message, &registry)
}

/// Wrap clear key material under the test variant LMK, returned as
/// uppercase hex without a scheme tag.
pub(crate) fn wrap_under_test_lmk(clear_hex: &str, type_code: &str, scheme: KeyScheme) -> String {
    let lmk = test_variant_lmk();
    let clear = hex::decode(clear_hex).unwrap();
    let key_type = KeyType::from_code(type_code).unwrap();
    let wrapped = lmk.encrypt_under_lmk(&clear, key_type, scheme).unwrap();
    hex::encode_upper(wrapped)
}

/// Decrypt a wrapped key (uppercase hex) under the test variant LMK.
pub(crate) fn unwrap_under_test_lmk(
    wrapped_hex: &str,
    type_code: &str,
    scheme: KeyScheme,
) -> Vec<u8> {
    let lmk = test_variant_lmk();
    let wrapped = hex::decode(wrapped_hex).unwrap();
    let key_type = KeyType::from_code(type_code).unwrap();
    lmk.decrypt_under_lmk(&wrapped, key_type, scheme)
        .unwrap()
        .to_vec()
}
