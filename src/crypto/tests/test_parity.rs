use crate::crypto::*;

#[test]
fn test_check_key_parity() {
    // 0x01 has one bit set, 0xFE has seven: both odd.
    assert!(check_key_parity(&[0x01, 0xFE, 0x10, 0x61]));
    // 0x00 and 0xFF are even parity.
    assert!(!check_key_parity(&[0x01, 0x00]));
    assert!(!check_key_parity(&[0xFF]));
}

#[test]
fn test_fix_key_parity_flips_low_bit_only() {
    let mut key = [0x00, 0x01, 0xFF, 0xAB];
    fix_key_parity(&mut key);
    assert_eq!(key, [0x01, 0x01, 0xFE, 0xAB]);
    assert!(check_key_parity(&key));
}

#[test]
fn test_generate_random_key_parity_and_length() {
    for len in [8, 16, 24] {
        let key = generate_random_key(len).unwrap();
        assert_eq!(key.len(), len);
        assert!(check_key_parity(&key), "random key must be parity adjusted");
    }
    assert!(generate_random_key(12).is_err());
    assert!(generate_random_key(0).is_err());
}
