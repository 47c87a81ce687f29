use crate::crypto::check_key_parity;
use crate::crypto::emv::*;

fn test_imk() -> Vec<u8> {
    hex::decode("0123456789ABCDEFFEDCBA9876543210").unwrap()
}

#[test]
fn test_option_a_produces_parity_adjusted_double_key() {
    let mk = derive_icc_mk_a(&test_imk(), "41111111111111", "00").unwrap();
    assert_eq!(mk.len(), 16);
    assert!(check_key_parity(&mk));
}

#[test]
fn test_option_a_is_deterministic_and_card_specific() {
    let imk = test_imk();
    let a = derive_icc_mk_a(&imk, "41111111111111", "00").unwrap();
    let b = derive_icc_mk_a(&imk, "41111111111111", "00").unwrap();
    assert_eq!(*a, *b);

    let other_pan = derive_icc_mk_a(&imk, "41111111111112", "00").unwrap();
    assert_ne!(*a, *other_pan);

    let other_psn = derive_icc_mk_a(&imk, "41111111111111", "01").unwrap();
    assert_ne!(*a, *other_psn);
}

#[test]
fn test_option_a_input_validation() {
    let imk = test_imk();
    assert!(derive_icc_mk_a(&imk[..8], "41111111111111", "00").is_err());
    assert!(derive_icc_mk_a(&imk, "4111111111111A", "00").is_err());
    assert!(derive_icc_mk_a(&imk, "41111111111111", "0").is_err());
    assert!(derive_icc_mk_a(&imk, "", "00").is_err());
}

#[test]
fn test_option_b_falls_through_for_short_pans() {
    let imk = test_imk();
    let a = derive_icc_mk_a(&imk, "4111111111111111", "00").unwrap();
    let b = derive_icc_mk_b(&imk, "4111111111111111", "00").unwrap();
    assert_eq!(*a, *b);
}

#[test]
fn test_option_b_hashes_long_pans() {
    let imk = test_imk();
    let mk = derive_icc_mk_b(&imk, "4111111111111111112", "00").unwrap();
    assert_eq!(mk.len(), 16);
    assert!(check_key_parity(&mk));

    // The hash proxy must not equal the rightmost-16 Option A result.
    let truncated = derive_icc_mk_a(&imk, "4111111111111111112", "00").unwrap();
    assert_ne!(*mk, *truncated);
}

#[test]
fn test_common_session_key_varies_with_atc() {
    let imk = test_imk();
    let mk = derive_icc_mk_a(&imk, "41111111111111", "00").unwrap();

    let sk1 = derive_common_session_key(&mk, &[0x00, 0x5E]).unwrap();
    let sk2 = derive_common_session_key(&mk, &[0x00, 0x5F]).unwrap();
    assert_eq!(sk1.len(), 16);
    assert!(check_key_parity(&sk1));
    assert_ne!(*sk1, *sk2);

    assert!(derive_common_session_key(&mk[..8], &[0, 0]).is_err());
}
