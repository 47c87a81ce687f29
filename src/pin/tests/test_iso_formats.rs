use crate::pin::*;

const PAN: &str = "12345678901234";

#[test]
fn test_encode_pinblock_iso_0() {
    let test_cases = [
        ("1234", "041217BA9876FEDC"),
        ("12345678", "081217131F76FEDC"),
        ("123456789012", "0C1217131F1913DC"),
    ];

    for (pin, expected_hex) in test_cases {
        let block = encode_pinblock_iso_0(pin, PAN).unwrap();
        assert_eq!(
            hex::encode_upper(block),
            expected_hex,
            "Failed test for PIN: {}",
            pin
        );
        assert_eq!(decode_pinblock_iso_0(&block, PAN).unwrap(), pin);
    }
}

#[test]
fn test_iso_0_uses_rightmost_digits_excluding_check() {
    // A 12-digit account field is taken verbatim.
    let block_field = encode_pinblock_iso_0("1234", "234567890123").unwrap();
    let block_pan = encode_pinblock_iso_0("1234", PAN).unwrap();
    assert_eq!(block_field, block_pan);
}

#[test]
fn test_decode_iso_0_rejects_mismatched_pan() {
    let block = encode_pinblock_iso_0("1234", PAN).unwrap();
    // A different PAN corrupts the fill nibbles.
    assert!(decode_pinblock_iso_0(&block, "99999999901234").is_err());
}

#[test]
fn test_iso_1_roundtrip_and_validation() {
    let seed = [0x7Au8; 8];
    let block = encode_pinblock_iso_1("92389", &seed).unwrap();
    assert_eq!(block[0], 0x15);
    assert_eq!(decode_pinblock_iso_1(&block).unwrap(), "92389");

    // Control nibble must be 1.
    let mut wrong = block;
    wrong[0] = 0x25;
    assert!(decode_pinblock_iso_1(&wrong).is_err());

    assert!(encode_pinblock_iso_1("123", &seed).is_err());
    assert!(encode_pinblock_iso_1("1234567890123", &seed).is_err());
    assert!(encode_pinblock_iso_1("12A4", &seed).is_err());
}

#[test]
fn test_encode_pinblock_iso_2() {
    let test_cases = [
        ("1234", "241234FFFFFFFFFF"),
        ("1234567890", "2A1234567890FFFF"),
    ];
    for (pin, expected_hex) in test_cases {
        let block = encode_pinblock_iso_2(pin).unwrap();
        assert_eq!(hex::encode_upper(block), expected_hex);
        assert_eq!(decode_pinblock_iso_2(&block).unwrap(), pin);
    }
}

#[test]
fn test_decode_iso_2_validates_fill() {
    let mut block = encode_pinblock_iso_2("1234").unwrap();
    block[7] = 0xF0;
    assert!(decode_pinblock_iso_2(&block).is_err());
}

#[test]
fn test_iso_3_known_block() {
    let block = encode_pinblock_iso_3("1234", PAN, &[0xFF; 8]).unwrap();
    assert_eq!(hex::encode_upper(block), "341217BA9876FEDC");
    assert_eq!(decode_pinblock_iso_3(&block, PAN).unwrap(), "1234");
}

#[test]
fn test_iso_3_fill_is_transformed_to_af() {
    // Decimal seed nibbles must land in A..F before the PAN XOR.
    let block = encode_pinblock_iso_3("1234", PAN, &[0x09; 8]).unwrap();
    assert_eq!(decode_pinblock_iso_3(&block, PAN).unwrap(), "1234");
}

#[test]
fn test_iso_3_rejects_format_0_block() {
    let block = encode_pinblock_iso_0("1234", PAN).unwrap();
    assert!(decode_pinblock_iso_3(&block, PAN).is_err());
}

#[test]
fn test_iso_4_roundtrip_with_aes() {
    let key = hex::decode("00112233445566778899AABBCCDDEEFF").unwrap();
    let pin = "1234";
    let pan = "1234567890123456789";

    let encrypted = encipher_pinblock_iso_4(&key, pin, pan, &[0xFF; 8]).unwrap();
    assert_eq!(
        hex::encode_upper(&encrypted),
        "28B41FDDD29B743E93124BD8E32D921E"
    );

    let decrypted = decipher_pinblock_iso_4(&key, &encrypted, pan).unwrap();
    assert_eq!(decrypted, pin);
}

#[test]
fn test_iso_4_wrong_pan_fails_decode() {
    let key = hex::decode("00112233445566778899AABBCCDDEEFF").unwrap();
    let encrypted =
        encipher_pinblock_iso_4(&key, "1234", "1234567890123456789", &[0xFF; 8]).unwrap();
    assert!(decipher_pinblock_iso_4(&key, &encrypted, "9234567890123456789").is_err());
}
