//! Response headers.
//!
//! - [`Header`] a single response header
//! - [`IntoHeaders`] conversion of header collections supplied by applications
//! - [`validate`] shape and content check of a header collection
use bytes::Bytes;

use crate::error::{Error, Result};
use crate::value::Value;

mod validate;

#[cfg(test)]
mod test;

pub use validate::{validate, parse_content_length};

/// A response header.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Header {
    name: Bytes,
    value: Bytes,
}

impl Header {
    /// Create header from name and value.
    ///
    /// Content is not checked here, see [`validate`].
    #[inline]
    pub fn new<N: Into<Bytes>, V: Into<Bytes>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Returns `true` if this is a `Content-Length` header, case insensitive.
    #[inline]
    pub fn is_content_length(&self) -> bool {
        self.name.eq_ignore_ascii_case(b"content-length")
    }
}

impl std::fmt::Debug for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Header")
            .field("name", &String::from_utf8_lossy(&self.name))
            .field("value", &String::from_utf8_lossy(&self.value))
            .finish()
    }
}

// ===== IntoHeaders =====

/// A header collection that can be handed to the response bridge.
///
/// The bridge always keeps its own copy, so the application may keep
/// mutating the original collection afterwards.
pub trait IntoHeaders {
    /// Convert into owned headers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] if the collection does not have the shape of
    /// a list of name and value byte string pairs.
    fn into_headers(self) -> Result<Vec<Header>>;
}

impl IntoHeaders for Vec<Header> {
    #[inline]
    fn into_headers(self) -> Result<Vec<Header>> {
        Ok(self)
    }
}

impl IntoHeaders for &[Header] {
    #[inline]
    fn into_headers(self) -> Result<Vec<Header>> {
        Ok(self.to_vec())
    }
}

impl IntoHeaders for &Vec<Header> {
    #[inline]
    fn into_headers(self) -> Result<Vec<Header>> {
        Ok(self.clone())
    }
}

impl<N: Into<Bytes>, V: Into<Bytes>> IntoHeaders for Vec<(N, V)> {
    fn into_headers(self) -> Result<Vec<Header>> {
        Ok(self.into_iter().map(|(n, v)| Header::new(n, v)).collect())
    }
}

impl<N: Into<Bytes>, V: Into<Bytes>, const S: usize> IntoHeaders for [(N, V); S] {
    fn into_headers(self) -> Result<Vec<Header>> {
        Ok(self.into_iter().map(|(n, v)| Header::new(n, v)).collect())
    }
}

impl IntoHeaders for Value {
    fn into_headers(self) -> Result<Vec<Header>> {
        let entries = match self {
            Value::List(entries) => entries,
            other => {
                return Err(Error::Type(format!(
                    "response headers must be a list, value of type {} found",
                    other.type_name()
                )));
            }
        };

        let mut headers = Vec::with_capacity(entries.len());

        for entry in entries {
            let pair = match entry {
                Value::Tuple(pair) => pair,
                other => return Err(Error::type_mismatch("list of tuple values", other.type_name())),
            };
            let [name, value] = <[Value; 2]>::try_from(pair).map_err(|pair| {
                Error::Type(format!("tuple of length 2 expected, length is {}", pair.len()))
            })?;
            let name = match name {
                Value::Bytes(name) => name,
                other => return Err(Error::type_mismatch("byte string header name", other.type_name())),
            };
            let value = match value {
                Value::Bytes(value) => value,
                other => return Err(Error::type_mismatch("byte string header value", other.type_name())),
            };
            headers.push(Header { name, value });
        }

        Ok(headers)
    }
}
