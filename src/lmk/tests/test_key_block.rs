use crate::lmk::{KeyBlockHeader, KeyBlockLmk, KeyScheme, KeyType, LmkProvider};
use crate::test_support::test_key_block_lmk;

#[test]
fn test_key_block_roundtrip() {
    let lmk = test_key_block_lmk();
    let clear = hex::decode("3F419E1CB7079442AA37474C2EFBF8B8").unwrap();

    let record = lmk
        .encrypt_under_lmk(&clear, KeyType::ZPK, KeyScheme::KeyBlock)
        .unwrap();
    let text = std::str::from_utf8(&record).unwrap();
    assert!(text.is_ascii());
    assert!(text.starts_with("1P0TB00N00"), "header prefix: {}", text);

    let unwrapped = lmk
        .decrypt_under_lmk(&record, KeyType::ZPK, KeyScheme::KeyBlock)
        .unwrap();
    assert_eq!(unwrapped.as_slice(), clear.as_slice());
}

#[test]
fn test_key_block_roundtrip_triple_length() {
    let lmk = test_key_block_lmk();
    let clear =
        hex::decode("0123456789ABCDEFFEDCBA98765432100123456789ABCDEF").unwrap();

    let record = lmk
        .encrypt_under_lmk(&clear, KeyType::ZMK, KeyScheme::KeyBlock)
        .unwrap();
    let unwrapped = lmk
        .decrypt_under_lmk(&record, KeyType::ZMK, KeyScheme::KeyBlock)
        .unwrap();
    assert_eq!(unwrapped.as_slice(), clear.as_slice());
}

#[test]
fn test_unwrap_rejects_wrong_key_type() {
    let lmk = test_key_block_lmk();
    let clear = hex::decode("3F419E1CB7079442AA37474C2EFBF8B8").unwrap();

    let record = lmk
        .encrypt_under_lmk(&clear, KeyType::ZPK, KeyScheme::KeyBlock)
        .unwrap();
    assert!(lmk
        .decrypt_under_lmk(&record, KeyType::ZMK, KeyScheme::KeyBlock)
        .is_err());
}

#[test]
fn test_unwrap_detects_tampering() {
    let lmk = test_key_block_lmk();
    let clear = hex::decode("3F419E1CB7079442AA37474C2EFBF8B8").unwrap();

    let record = lmk
        .encrypt_under_lmk(&clear, KeyType::ZPK, KeyScheme::KeyBlock)
        .unwrap();

    // Flip one ciphertext nibble.
    let mut tampered = record.clone();
    let pos = 14;
    tampered[pos] = if tampered[pos] == b'0' { b'1' } else { b'0' };
    assert!(lmk
        .decrypt_under_lmk(&tampered, KeyType::ZPK, KeyScheme::KeyBlock)
        .is_err());

    // Flip one MAC nibble.
    let mut tampered = record.clone();
    let pos = record.len() - 1;
    tampered[pos] = if tampered[pos] == b'0' { b'1' } else { b'0' };
    assert!(lmk
        .decrypt_under_lmk(&tampered, KeyType::ZPK, KeyScheme::KeyBlock)
        .is_err());
}

#[test]
fn test_variant_schemes_are_refused() {
    let lmk = test_key_block_lmk();
    let clear = [0x01u8; 16];
    assert!(lmk
        .encrypt_under_lmk(&clear, KeyType::ZPK, KeyScheme::Double)
        .is_err());
    assert!(lmk
        .decrypt_under_lmk(&clear, KeyType::ZPK, KeyScheme::Double)
        .is_err());
}

#[test]
fn test_header_parse_and_export() {
    let header = KeyBlockHeader::for_key_type(KeyType::MK_AC);
    let text = header.export_str();
    assert_eq!(text.len(), 12);
    assert_eq!(text, "1E0TB00N0019");

    let parsed = KeyBlockHeader::from_str(&text).unwrap();
    assert_eq!(parsed, header);

    assert!(KeyBlockHeader::from_str("1E0TB00N00").is_err());
    assert!(KeyBlockHeader::from_str("9E0TB00N0019").is_err());
    assert!(KeyBlockHeader::from_str("1E0QB00N0019").is_err());
    assert!(KeyBlockHeader::from_str("1E0TB00N0119").is_err());
}

#[test]
fn test_lmk_length_validation() {
    assert!(KeyBlockLmk::new(&[0u8; 16]).is_ok());
    assert!(KeyBlockLmk::new(&[0u8; 24]).is_ok());
    assert!(KeyBlockLmk::new(&[0u8; 32]).is_ok());
    assert!(KeyBlockLmk::new(&[0u8; 20]).is_err());
}
