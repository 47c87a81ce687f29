use super::{run, unwrap_under_test_lmk, wrap_under_test_lmk};
use crate::crypto::{check_key_parity, kcv, tdes_enc_ecb};
use crate::lmk::KeyScheme;

const ZMK: &str = "0123456789ABCDEFFEDCBA9876543210";
const ZPK: &str = "FEDCBA98765432100123456789ABCDEF";

fn wrapped_zmk() -> String {
    wrap_under_test_lmk(ZMK, "000", KeyScheme::Double)
}

#[test]
fn test_fa_translates_a_zpk_to_the_lmk() {
    let clear_zmk = hex::decode(ZMK).unwrap();
    let clear_zpk = hex::decode(ZPK).unwrap();
    let under_zmk = tdes_enc_ecb(&clear_zpk, &clear_zmk).unwrap();

    let message = format!(
        "FAU{}U{}",
        wrapped_zmk(),
        hex::encode_upper(under_zmk)
    );
    let response = run(message.as_bytes());
    let text = std::str::from_utf8(&response).unwrap();

    assert_eq!(&text[..4], "FB00");
    assert_eq!(&text[4..5], "U");
    let translated = unwrap_under_test_lmk(&text[5..37], "001", KeyScheme::Double);
    assert_eq!(translated, clear_zpk);
    assert_eq!(&text[37..43], kcv(&clear_zpk, 6).unwrap());
}

#[test]
fn test_fa_fixes_parity_and_reports_advice() {
    let clear_zmk = hex::decode(ZMK).unwrap();
    // Even-parity ZPK material.
    let bad_zpk = hex::decode("00112233445566770011223344556677").unwrap();
    assert!(!check_key_parity(&bad_zpk));
    let under_zmk = tdes_enc_ecb(&bad_zpk, &clear_zmk).unwrap();

    let message = format!(
        "FAU{}U{}",
        wrapped_zmk(),
        hex::encode_upper(under_zmk)
    );
    let response = run(message.as_bytes());
    let text = std::str::from_utf8(&response).unwrap();

    assert_eq!(&text[..4], "FB01");
    let translated = unwrap_under_test_lmk(&text[5..37], "001", KeyScheme::Double);
    assert!(check_key_parity(&translated));
    // Parity fixing only touches the low bit of each byte.
    for (fixed, original) in translated.iter().zip(bad_zpk.iter()) {
        assert_eq!(fixed & 0xFE, original & 0xFE);
    }
}

#[test]
fn test_fa_rejects_an_all_zero_zpk() {
    let message = format!("FAU{}U{}", wrapped_zmk(), "0".repeat(32));
    assert_eq!(run(message.as_bytes()), b"FB11");
}

#[test]
fn test_fa_rejects_a_zmk_with_bad_parity() {
    let wrapped = wrap_under_test_lmk(&"F".repeat(32), "000", KeyScheme::Double);
    let message = format!("FAU{}U{}", wrapped, "1".repeat(32));
    assert_eq!(run(message.as_bytes()), b"FB10");
}

#[test]
fn test_fa_short_input() {
    assert_eq!(run(b"FAU0123"), b"FB15");
}
