use crate::lmk::KeyType;

#[test]
fn test_known_type_codes() {
    let cases = [
        ("000", KeyType::ZMK, 4),
        ("001", KeyType::ZPK, 6),
        ("002", KeyType::TPK, 14),
        ("009", KeyType::BDK, 28),
        ("109", KeyType::MK_AC, 28),
        ("402", KeyType::CVK, 14),
        ("609", KeyType::ZPK_INTERCHANGE, 28),
    ];
    for (code, expected, pair_index) in cases {
        let parsed = KeyType::from_code(code).unwrap();
        assert_eq!(parsed, expected, "code {}", code);
        assert_eq!(parsed.lmk_pair_index(), pair_index, "code {}", code);
        assert_eq!(parsed.code(), code);
    }
}

#[test]
fn test_variant_bytes() {
    assert_eq!(KeyType::ZMK.variant_byte(), 0x00);
    assert_eq!(KeyType::MK_AC.variant_byte(), 0xA6);
    assert_eq!(KeyType::CVK.variant_byte(), 0xDE);
    assert_eq!(KeyType::ZPK_INTERCHANGE.variant_byte(), 0x50);
}

#[test]
fn test_short_form_expansion() {
    assert_eq!(KeyType::from_short_code("00").unwrap(), KeyType::ZMK);
    assert_eq!(KeyType::from_short_code("01").unwrap(), KeyType::ZPK);
    assert_eq!(KeyType::from_short_code("42").unwrap(), KeyType::CVK);
    assert_eq!(KeyType::from_short_code("19").unwrap(), KeyType::MK_AC);
    assert_eq!(
        KeyType::from_short_code("0D").unwrap().lmk_pair_index(),
        36
    );
}

#[test]
fn test_rejected_codes() {
    assert!(KeyType::from_code("0000").is_err());
    assert!(KeyType::from_code("0E0").is_err());
    assert!(KeyType::from_code("00E").is_err());
    assert!(KeyType::from_code("A00").is_err());
    assert!(KeyType::from_short_code("0E").is_err());
    assert!(KeyType::from_short_code("E0").is_err());
    assert!(KeyType::from_short_code("0").is_err());
}
