use super::run;
use crate::command::reply_code;

#[test]
fn test_reply_code_increments_the_second_letter() {
    assert_eq!(reply_code(b"A0"), *b"A1");
    assert_eq!(reply_code(b"BU"), *b"BV");
    assert_eq!(reply_code(b"CA"), *b"CB");
    assert_eq!(reply_code(b"CW"), *b"CX");
    assert_eq!(reply_code(b"CY"), *b"CZ");
    assert_eq!(reply_code(b"DC"), *b"DD");
    assert_eq!(reply_code(b"EC"), *b"ED");
    assert_eq!(reply_code(b"FA"), *b"FB");
    assert_eq!(reply_code(b"HC"), *b"HD");
    assert_eq!(reply_code(b"KQ"), *b"KR");
    assert_eq!(reply_code(b"NC"), *b"ND");
    assert_eq!(reply_code(b"B2"), *b"B3");
}

#[test]
fn test_unknown_commands_are_reported_as_disabled() {
    assert_eq!(run(b"XX"), b"XY68");
    assert_eq!(run(b"Q91234"), b"Q:68");
}

#[test]
fn test_messages_shorter_than_a_code_are_rejected() {
    assert_eq!(run(b"A"), b"ZZ15");
    assert_eq!(run(b""), b"ZZ15");
}
