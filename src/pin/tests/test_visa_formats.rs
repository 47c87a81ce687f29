use crate::pin::*;

const PAN: &str = "1234567890123456";
const UDK: &str = "0123456789ABCDEFFEDCBA9876543210";

#[test]
fn test_visa_1_known_block() {
    // Field 1: 41234FFFFFFFFFFF; field 2: 0000 + 12 rightmost digits
    // including the check digit (567890123456).
    let block = encode_pinblock_visa_1("1234", PAN).unwrap();
    assert_eq!(hex::encode_upper(block), "412319876FEDCBA9");
    assert_eq!(decode_pinblock_visa_1(&block, PAN).unwrap(), "1234");
}

#[test]
fn test_visa_1_rejects_bad_fill() {
    let mut block = encode_pinblock_visa_1("1234", PAN).unwrap();
    block[7] ^= 0x01;
    assert!(decode_pinblock_visa_1(&block, PAN).is_err());
}

#[test]
fn test_visa_new_only_known_block() {
    // Key block: 00000000 + FEDCBA98... rightmost 8 hex of the UDK is
    // 76543210.
    let block = encode_pinblock_visa_new_only("1234", UDK).unwrap();
    assert_eq!(hex::encode_upper(block), "041234FF89ABCDEF");
    assert_eq!(decode_pinblock_visa_new_only(&block, UDK).unwrap(), "1234");
}

#[test]
fn test_visa_new_only_udk_validation() {
    assert!(encode_pinblock_visa_new_only("1234", "1234").is_err());
    assert!(encode_pinblock_visa_new_only("1234", "0123456789ABCDEG").is_err());
}

#[test]
fn test_visa_new_old_roundtrip() {
    let test_cases = [("1234", "9999"), ("567890", "4321"), ("123456789012", "999999999999")];
    for (new_pin, old_pin) in test_cases {
        let block = encode_pinblock_visa_new_old(new_pin, old_pin, UDK).unwrap();
        let decoded = decode_pinblock_visa_new_old(&block, old_pin, UDK).unwrap();
        assert_eq!(decoded, new_pin, "new {} old {}", new_pin, old_pin);
    }
}

#[test]
fn test_visa_new_old_requires_matching_old_pin() {
    let block = encode_pinblock_visa_new_old("1234", "9999", UDK).unwrap();
    // A wrong old PIN disturbs the recovered PIN field. With the PIN
    // digits shifted the control or fill check fails.
    assert!(decode_pinblock_visa_new_old(&block, "6666", UDK).is_err());
}
