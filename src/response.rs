//! Response bridge.
//!
//! [`Responder`] is the object an application talks to. It validates the
//! status line and headers handed to [`start_response`], writes the response
//! head on the first body write, and clips the body to the declared
//! `Content-Length`.
//!
//! # Usage
//!
//! ```
//! use cgi_bridge::response::Responder;
//!
//! let mut output = Vec::new();
//! let mut responder = Responder::new(&mut output);
//!
//! let mut write = responder
//!     .start_response("200 OK", [("Content-Length", "5")], None)
//!     .unwrap();
//! write.write(&b"hello world"[..]).unwrap();
//! write.write(&b"ignored"[..]).unwrap();
//!
//! assert_eq!(output, b"Status: 200 OK\r\nContent-Length: 5\r\n\r\nhello");
//! ```
//!
//! [`start_response`]: Responder::start_response
use bytes::BytesMut;
use std::io::Write;

use crate::body::IntoChunk;
use crate::error::{Error, Failure, ProtocolError, Result};
use crate::headers::{self, IntoHeaders};
use crate::log::{debug, trace};

mod gate;
mod write;


use gate::{Head, OutputGate};

pub use write::{head_len, write_head};

/// The response bridge for a single request.
///
/// Owns the raw output for the lifetime of the request. Every write of non
/// empty data is flushed to the output immediately.
pub struct Responder<'a> {
    output: &'a mut dyn Write,
    gate: OutputGate,
}

impl<'a> Responder<'a> {
    /// Create bridge writing into `output`.
    pub fn new(output: &'a mut dyn Write) -> Self {
        Self {
            output,
            gate: OutputGate::new(),
        }
    }

    /// Returns `true` if a response-start call has succeeded.
    #[inline]
    pub const fn is_started(&self) -> bool {
        self.gate.is_started()
    }

    /// Returns `true` if the response head has been written.
    #[inline]
    pub const fn is_flushed(&self) -> bool {
        self.gate.is_flushed()
    }

    /// Returns the declared `Content-Length`, once the head is flushed.
    #[inline]
    pub const fn declared_length(&self) -> Option<u64> {
        self.gate.declared()
    }

    /// Returns total length of body chunks the application attempted to write.
    ///
    /// This counts the chunks before clipping against the declared length.
    #[inline]
    pub const fn bytes_emitted(&self) -> u64 {
        self.gate.emitted()
    }

    /// Returns `true` if the declared length is set and reached.
    #[inline]
    pub const fn is_complete(&self) -> bool {
        self.gate.is_complete()
    }

    /// Start the response.
    ///
    /// Headers are always validated first; a validation error leaves the
    /// bridge untouched. With `failure` given, a response that has not been
    /// flushed yet has its status and headers replaced; a flushed response
    /// cannot be replaced, so the failure is returned as [`Error::Aborted`].
    ///
    /// Returns the body write primitive on success.
    ///
    /// # Errors
    ///
    /// - [`Error::Type`] or [`Error::Protocol`] or [`Error::Value`] for invalid headers
    /// - [`Error::Protocol`] if the head is already flushed and no failure is given
    /// - [`Error::Aborted`] if the head is already flushed and a failure is
    ///   given, or the bridge error carried by that failure
    pub fn start_response<S, H>(
        &mut self,
        status: S,
        headers: H,
        failure: Option<Failure>,
    ) -> Result<Writer<'_, 'a>>
    where
        S: Into<String>,
        H: IntoHeaders,
    {
        let headers = headers.into_headers()?;
        let declared = headers::validate(&headers)?;

        match failure {
            Some(failure) if self.is_flushed() => {
                debug!("response already flushed, aborting: {failure}");
                return Err(Error::from(failure));
            }
            Some(failure) => {
                debug!("replacing pending response: {failure}");
            }
            None if self.is_flushed() => {
                return Err(ProtocolError::AlreadyStarted.into());
            }
            None => {}
        }

        let status = status.into();
        debug!("response started: {status}");

        self.gate.start(Head {
            status,
            headers,
            declared,
        });

        Ok(Writer { responder: self })
    }

    /// Write body chunk.
    ///
    /// The first call writes the response head. Once the declared length is
    /// reached, further data is dropped.
    ///
    /// # Errors
    ///
    /// - [`Error::Type`] if the chunk is not a byte string
    /// - [`Error::Protocol`] if the response is not started
    /// - [`Error::Io`] if writing to the output fails
    pub fn write<C: IntoChunk>(&mut self, chunk: C) -> Result<()> {
        let data = chunk.into_chunk()?;

        if !self.is_started() {
            return Err(ProtocolError::NotStarted.into());
        }

        if let Some(head) = self.gate.pending() {
            let mut bufm = BytesMut::with_capacity(head_len(&head.status, &head.headers));
            write_head(&head.status, &head.headers, &mut bufm);
            self.output.write_all(&bufm)?;

            let force = data.is_empty() || head.declared == Some(0);
            debug!("response head flushed, declared length: {:?}", head.declared);

            self.gate.commit();

            if force {
                self.output.flush()?;
            }
        }

        if data.is_empty() {
            return Ok(());
        }

        let admitted = self.gate.admit(data.len());
        if admitted < data.len() {
            trace!("body clipped, {} of {} bytes dropped", data.len() - admitted, data.len());
        }

        if admitted > 0 {
            self.output.write_all(&data[..admitted])?;
            self.output.flush()?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Responder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

// ===== Writer =====

/// Body write primitive returned by [`Responder::start_response`].
///
/// For applications that write body data directly instead of returning a
/// body.
#[derive(Debug)]
pub struct Writer<'r, 'a> {
    responder: &'r mut Responder<'a>,
}

impl Writer<'_, '_> {
    /// Write body chunk, see [`Responder::write`].
    #[inline]
    pub fn write<C: IntoChunk>(&mut self, chunk: C) -> Result<()> {
        self.responder.write(chunk)
    }
}
