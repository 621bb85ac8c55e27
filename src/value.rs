//! Dynamically typed values.
use bytes::Bytes;

/// A dynamically typed value.
///
/// Request attributes are stored as `Value`s. Applications that build
/// response headers or body chunks at runtime may also hand them to the
/// bridge as `Value`s, in which case their shape is checked before use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Bytes(Bytes),
    Bool(bool),
    Int(i64),
    Tuple(Vec<Value>),
    List(Vec<Value>),
}

impl Value {
    /// Returns the name of the value type, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
        }
    }

    /// Returns the value as `str`, if it is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as `bool`, if it is a [`Value::Bool`].
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Bytes> for Value {
    #[inline]
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<&'static [u8]> for Value {
    #[inline]
    fn from(value: &'static [u8]) -> Self {
        Self::Bytes(Bytes::from_static(value))
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    #[inline]
    fn from((a, b): (A, B)) -> Self {
        Self::Tuple(vec![a.into(), b.into()])
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    #[inline]
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}
