use super::Header;
use crate::error::{Error, ProtocolError, Result};

/// Validate response headers.
///
/// Returns the declared content length, if any. When more than one
/// `Content-Length` header is present, the last one wins.
///
/// # Errors
///
/// Returns [`Error::Protocol`] if a name or value contains a line break, and
/// [`Error::Value`] if a `Content-Length` value is not a non negative integer.
pub fn validate(headers: &[Header]) -> Result<Option<u64>> {
    let mut declared = None;

    for header in headers {
        if has_line_break(header.name()) || has_line_break(header.value()) {
            return Err(ProtocolError::LineBreak {
                name: String::from_utf8_lossy(header.name()).into_owned(),
                value: String::from_utf8_lossy(header.value()).into_owned(),
            }
            .into());
        }

        if header.is_content_length() {
            match parse_content_length(header.value()) {
                Some(len) => declared = Some(len),
                None => {
                    return Err(Error::Value(
                        String::from_utf8_lossy(header.value()).into_owned(),
                    ));
                }
            }
        }
    }

    Ok(declared)
}

const fn has_line_break(mut bytes: &[u8]) -> bool {
    while let [byte, rest @ ..] = bytes {
        if matches!(byte, b'\n' | b'\r') {
            return true;
        }
        bytes = rest;
    }
    false
}

/// Parse a `Content-Length` value.
///
/// Surrounding whitespace and a leading sign are accepted, so `" +12 "` and
/// `"-0"` are valid. Returns `None` for anything that is not an integer, or
/// is a negative integer.
pub fn parse_content_length(bytes: &[u8]) -> Option<u64> {
    let bytes = bytes.trim_ascii();

    let (negative, digits) = match bytes {
        [b'-', rest @ ..] => (true, rest),
        [b'+', rest @ ..] => (false, rest),
        _ => (false, bytes),
    };

    if digits.is_empty() {
        return None;
    }

    let mut len: u64 = 0;
    for &byte in digits {
        if !byte.is_ascii_digit() {
            return None;
        }
        len = len.checked_mul(10)?.checked_add(u64::from(byte - b'0'))?;
    }

    match (negative, len) {
        (true, 0) | (false, _) => Some(len),
        (true, _) => None,
    }
}
