use super::{run, unwrap_under_test_lmk, wrap_under_test_lmk};
use crate::crypto::{check_key_parity, tdes_dec_ecb};
use crate::lmk::KeyScheme;

const OLD_KEY: &str = "0123456789ABCDEFFEDCBA9876543210";

#[test]
fn test_hc_generates_a_replacement_double_key() {
    let wrapped = wrap_under_test_lmk(OLD_KEY, "002", KeyScheme::Double);
    let response = run(format!("HCU{}", wrapped).as_bytes());
    let text = std::str::from_utf8(&response).unwrap();

    assert_eq!(&text[..4], "HD00");
    assert_eq!(text.len(), 4 + 33 + 33);
    assert_eq!(&text[4..5], "U");
    assert_eq!(&text[37..38], "U");

    let under_old = hex::decode(&text[5..37]).unwrap();
    let new_key = unwrap_under_test_lmk(&text[38..70], "002", KeyScheme::Double);
    assert!(check_key_parity(&new_key));
    assert_ne!(new_key, hex::decode(OLD_KEY).unwrap());

    // The terminal copy decrypts to the same key under the old key.
    let old = hex::decode(OLD_KEY).unwrap();
    assert_eq!(tdes_dec_ecb(&under_old, &old).unwrap(), new_key);
}

#[test]
fn test_hc_implicit_single_length_key() {
    let wrapped = wrap_under_test_lmk("0123456789ABCDEF", "002", KeyScheme::Single);
    let response = run(format!("HC{}", wrapped).as_bytes());
    let text = std::str::from_utf8(&response).unwrap();

    // Untagged request, untagged reply: two bare 16-hex keys.
    assert_eq!(&text[..4], "HD00");
    assert_eq!(text.len(), 4 + 16 + 16);

    let new_key = unwrap_under_test_lmk(&text[20..36], "002", KeyScheme::Single);
    assert_eq!(new_key.len(), 8);
    assert!(check_key_parity(&new_key));
}

#[test]
fn test_hc_engine_selector() {
    let wrapped = wrap_under_test_lmk(OLD_KEY, "002", KeyScheme::Double);

    // The default engine is registered as 00 as well.
    let response = run(format!("HCU{};XYZ%00", wrapped).as_bytes());
    assert_eq!(&response[..4], b"HD00");

    // Unknown engine ids are an LMK failure.
    let response = run(format!("HCU{}%ZZ", wrapped).as_bytes());
    assert_eq!(response, b"HD68");
}

#[test]
fn test_hc_rejects_bad_parity() {
    let wrapped = wrap_under_test_lmk(&"F".repeat(32), "002", KeyScheme::Double);
    assert_eq!(run(format!("HCU{}", wrapped).as_bytes()), b"HD10");
}
