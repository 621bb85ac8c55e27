use bytes::Bytes;

use super::{Header, IntoHeaders, parse_content_length, validate};
use crate::error::{Error, ErrorKind, ProtocolError};
use crate::value::Value;

fn pair(name: &'static str, value: &'static str) -> Value {
    Value::Tuple(vec![
        Value::Bytes(Bytes::from_static(name.as_bytes())),
        Value::Bytes(Bytes::from_static(value.as_bytes())),
    ])
}

#[test]
fn test_parse_content_length() {
    assert_eq!(parse_content_length(b"0"), Some(0));
    assert_eq!(parse_content_length(b"5"), Some(5));
    assert_eq!(parse_content_length(b" 12 "), Some(12));
    assert_eq!(parse_content_length(b"+7"), Some(7));
    assert_eq!(parse_content_length(b"-0"), Some(0));
    assert_eq!(parse_content_length(b"007"), Some(7));

    assert_eq!(parse_content_length(b""), None);
    assert_eq!(parse_content_length(b"-"), None);
    assert_eq!(parse_content_length(b"-1"), None);
    assert_eq!(parse_content_length(b"1.5"), None);
    assert_eq!(parse_content_length(b"12abc"), None);
    assert_eq!(parse_content_length(b"1 2"), None);
    assert_eq!(parse_content_length(b"99999999999999999999999"), None);
}

#[test]
fn validate_accepts() {
    macro_rules! test {
        ([$(($n:literal, $v:literal)),*] => $len:expr) => {
            let headers = [$(($n, $v)),*].into_headers().unwrap();
            assert_eq!(validate(&headers).unwrap(), $len);
        };
    }

    assert_eq!(validate(&[]).unwrap(), None);
    test!([("Content-Type", "text/plain")] => None);
    test!([("Content-Type", "text/plain"), ("Content-Length", "5")] => Some(5));
    test!([("content-length", "0")] => Some(0));
    test!([("CONTENT-LENGTH", " 42 ")] => Some(42));
    test!([("Content-Length", "5"), ("Content-Length", "7")] => Some(7));
    test!([("X-Empty", "")] => None);
}

#[test]
fn validate_rejects() {
    macro_rules! test {
        ([$(($n:literal, $v:literal)),*] => $kind:ident) => {
            let headers = [$(($n, $v)),*].into_headers().unwrap();
            let err = validate(&headers).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::$kind, "{err}");
        };
    }

    test!([("Content-Length", "five")] => ValueViolation);
    test!([("Content-Length", "-5")] => ValueViolation);
    test!([("Content-Length", "")] => ValueViolation);
    test!([("X-Ok", "1"), ("Content-Length", "1e3")] => ValueViolation);
    test!([("X-Split", "a\nb")] => ProtocolViolation);
    test!([("X-Split", "a\r\nInjected: yes")] => ProtocolViolation);
    test!([("X-Split\n", "a")] => ProtocolViolation);
    test!([("X-Cr", "a\rb")] => ProtocolViolation);

    let headers = [("X-Split", "a\nb")].into_headers().unwrap();
    assert!(matches!(
        validate(&headers),
        Err(Error::Protocol(ProtocolError::LineBreak { name, value })) if name == "X-Split" && value == "a\nb"
    ));
}

#[test]
fn value_headers() {
    let headers = Value::List(vec![pair("Content-Type", "text/html"), pair("Content-Length", "3")])
        .into_headers()
        .unwrap();
    assert_eq!(
        headers,
        vec![Header::new("Content-Type", "text/html"), Header::new("Content-Length", "3")]
    );
    assert_eq!(validate(&headers).unwrap(), Some(3));

    assert!(Value::List(vec![]).into_headers().unwrap().is_empty());
}

#[test]
fn value_headers_shape() {
    macro_rules! test {
        ($value:expr) => {
            let err = $value.into_headers().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TypeViolation, "{err}");
        };
    }

    // not a list
    test!(Value::Tuple(vec![pair("A", "b")]));
    test!(Value::Bytes(Bytes::from_static(b"A: b")));
    // entry not a tuple
    test!(Value::List(vec![Value::List(vec![Value::from(&b"A"[..]), Value::from(&b"b"[..])])]));
    test!(Value::List(vec![Value::from(&b"A: b"[..])]));
    // wrong arity
    test!(Value::List(vec![Value::Tuple(vec![Value::from(&b"A"[..])])]));
    test!(Value::List(vec![Value::Tuple(vec![
        Value::from(&b"A"[..]),
        Value::from(&b"b"[..]),
        Value::from(&b"c"[..]),
    ])]));
    // not byte strings
    test!(Value::List(vec![Value::Tuple(vec![Value::from("A"), Value::from(&b"b"[..])])]));
    test!(Value::List(vec![Value::Tuple(vec![Value::from(&b"A"[..]), Value::from("b")])]));
    test!(Value::List(vec![Value::Tuple(vec![Value::from(&b"A"[..]), Value::Int(5)])]));
}

#[test]
fn header_accessors() {
    let header = Header::new("Content-LENGTH", "10");
    assert!(header.is_content_length());
    assert_eq!(header.name(), b"Content-LENGTH");
    assert_eq!(header.value(), b"10");
    assert!(!Header::new("Content-Type", "10").is_content_length());
    assert_eq!(
        format!("{header:?}"),
        r#"Header { name: "Content-LENGTH", value: "10" }"#
    );
}
