//! Error types that can occur while bridging a request.
use std::path::PathBuf;

/// Boxed error carried by a [`Failure`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Convenient result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error that can occur while bridging a request.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Header or body data of the wrong shape or type.
    #[error("type violation: {0}")]
    Type(String),
    /// Response operations called out of the allowed order, or malformed header content.
    #[error("protocol violation: {0}")]
    Protocol(ProtocolError),
    /// Malformed declared content length.
    #[error("invalid content length: {0:?}")]
    Value(String),
    /// Subrequest path resolution could not find an existing file.
    #[error("no existing file along {0:?}")]
    NotFound(PathBuf),
    /// The host environment does not satisfy the bridge requirements.
    #[error("host environment fault: {0}")]
    Host(String),
    /// Raw transport error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Failure reported by the application that could not be recovered.
    #[error("request aborted: {0}")]
    Aborted(Failure),
}

/// Broad category of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    TypeViolation,
    ProtocolViolation,
    ValueViolation,
    NotFound,
    Host,
    Io,
    Aborted,
}

impl Error {
    /// Returns the category of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Type(_) => ErrorKind::TypeViolation,
            Self::Protocol(_) => ErrorKind::ProtocolViolation,
            Self::Value(_) => ErrorKind::ValueViolation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Host(_) => ErrorKind::Host,
            Self::Io(_) => ErrorKind::Io,
            Self::Aborted(_) => ErrorKind::Aborted,
        }
    }

    pub(crate) fn type_mismatch(expected: &str, found: &str) -> Self {
        Self::Type(format!("{expected} expected, value of type {found} found"))
    }
}

impl From<ProtocolError> for Error {
    #[inline]
    fn from(value: ProtocolError) -> Self {
        Self::Protocol(value)
    }
}

impl From<Failure> for Error {
    /// Bridge errors carried by a failure are unwrapped, so their kind is kept.
    fn from(value: Failure) -> Self {
        match value.inner.downcast::<Error>() {
            Ok(err) => *err,
            Err(inner) => Self::Aborted(Failure { inner }),
        }
    }
}

// ===== ProtocolError =====

/// Response protocol violation.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// Body written before response-start succeeded.
    #[error("response has not been started")]
    NotStarted,
    /// Response-start called again after headers were flushed, without a failure.
    #[error("headers have already been sent")]
    AlreadyStarted,
    /// Header name or value contains a line break.
    #[error("embedded line break in response header with name {name:?} and value {value:?}")]
    LineBreak { name: String, value: String },
}

// ===== Failure =====

/// A failure the application reports instead of completing normally.
///
/// Passed to [`Responder::start_response`] to replace a response that has not
/// yet been flushed, or returned by an [`Application`] or [`Body`] to abort the
/// request.
///
/// [`Responder::start_response`]: crate::response::Responder::start_response
/// [`Application`]: crate::app::Application
/// [`Body`]: crate::body::Body
#[derive(Debug)]
pub struct Failure {
    inner: BoxError,
}

impl Failure {
    /// Create a failure from any error.
    pub fn new<E: Into<BoxError>>(err: E) -> Self {
        Self { inner: err.into() }
    }

    /// Create a failure from a message.
    pub fn msg<M: std::fmt::Display>(msg: M) -> Self {
        Self { inner: msg.to_string().into() }
    }

    /// Returns the underlying error.
    pub fn get_ref(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.inner
    }

    /// Consume the failure, returning the underlying error.
    pub fn into_inner(self) -> BoxError {
        self.inner
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.inner, f)
    }
}

impl From<Error> for Failure {
    fn from(value: Error) -> Self {
        Self::new(value)
    }
}

impl From<std::io::Error> for Failure {
    fn from(value: std::io::Error) -> Self {
        Self::new(value)
    }
}
