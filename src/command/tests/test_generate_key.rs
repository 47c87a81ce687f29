use super::{run, unwrap_under_test_lmk, wrap_under_test_lmk};
use crate::crypto::{check_key_parity, kcv, tdes_dec_ecb};
use crate::lmk::KeyScheme;

#[test]
fn test_a0_mode_0_generates_and_wraps() {
    let response = run(b"A00000U");
    assert_eq!(response.len(), 43);
    assert_eq!(&response[..5], b"A100U");

    let text = std::str::from_utf8(&response).unwrap();
    let wrapped_hex = &text[5..37];
    let check = &text[37..43];

    // The reported check value belongs to the clear key under the LMK.
    let clear = unwrap_under_test_lmk(wrapped_hex, "000", KeyScheme::Double);
    assert!(check_key_parity(&clear));
    assert_eq!(kcv(&clear, 6).unwrap(), check);
}

#[test]
fn test_a0_supported_schemes() {
    for (tag, wire_len) in [('U', 43), ('T', 59), ('Y', 59), ('Z', 27)] {
        let message = format!("A00002{}", tag);
        let response = run(message.as_bytes());
        assert_eq!(response.len(), wire_len, "scheme {}", tag);
        assert_eq!(&response[..4], b"A100");
        assert_eq!(response[4], tag as u8);
    }

    // Paired singles render without a tag.
    let response = run(b"A00002X");
    assert_eq!(response.len(), 42);
    assert_eq!(&response[..4], b"A100");
}

#[test]
fn test_a0_mode_1_exports_under_zmk() {
    let message = format!("A01000UT{}", "F".repeat(48));
    let response = run(message.as_bytes());
    assert_eq!(response.len(), 76);
    assert_eq!(&response[..5], b"A100U");

    let text = std::str::from_utf8(&response).unwrap();
    let under_lmk = &text[5..37];
    assert_eq!(&text[37..38], "U");
    let under_zmk = hex::decode(&text[38..70]).unwrap();
    let check = &text[70..76];

    let clear = unwrap_under_test_lmk(under_lmk, "000", KeyScheme::Double);
    assert_eq!(kcv(&clear, 6).unwrap(), check);

    // The export must decrypt back to the same key under the clear ZMK.
    let clear_zmk = unwrap_under_test_lmk(&"F".repeat(48), "000", KeyScheme::Triple);
    let exported = tdes_dec_ecb(&under_zmk, &clear_zmk).unwrap();
    assert_eq!(exported, clear);
}

#[test]
fn test_a0_mode_1_with_delimiter() {
    let zmk = wrap_under_test_lmk(
        "0123456789ABCDEFFEDCBA9876543210",
        "000",
        KeyScheme::Double,
    );
    let message = format!("A01000U;U{}", zmk);
    let response = run(message.as_bytes());
    assert_eq!(&response[..4], b"A100");
    assert_eq!(response.len(), 76);
}

#[test]
fn test_a0_error_mapping() {
    // Bad mode.
    assert_eq!(run(b"A09000U"), b"A1A8");
    // Bad scheme.
    assert_eq!(run(b"A00000W"), b"A126");
    assert_eq!(run(b"A00000S"), b"A126");
    // Bad ZMK scheme.
    assert_eq!(run(b"A01000UQ1234"), b"A105");
    // Short input.
    assert_eq!(run(b"A00"), b"A115");
    assert_eq!(run(b"A01000U"), b"A115");
}
