//! Response body.
//!
//! - [`Body`] lazily produced sequence of body chunks
//! - [`IntoChunk`] conversion of a single chunk into bytes
//! - [`FileWrapper`] body reading from any [`Read`] in fixed size blocks
//! - [`pump`] drive a body through the response bridge
//!
//! [`Read`]: std::io::Read
use bytes::{Bytes, BytesMut};

use crate::error::{Error, Failure, Result};
use crate::value::Value;

mod file;
mod pump;


pub use file::{FileWrapper, DEFAULT_BLOCK_SIZE};
pub use pump::pump;

/// A lazily produced sequence of response body chunks.
pub trait Body {
    type Chunk: IntoChunk;

    /// Produce the next chunk, `None` when exhausted.
    fn next_chunk(&mut self) -> Option<Result<Self::Chunk, Failure>>;

    /// Release resources held by the body.
    ///
    /// [`pump`] calls this exactly once, however consumption ends.
    fn close(&mut self) -> Result<(), Failure> {
        Ok(())
    }

    /// Attach a release function, called after the body own [`close`].
    ///
    /// [`close`]: Body::close
    fn on_close<F>(self, f: F) -> OnClose<Self, F>
    where
        Self: Sized,
        F: FnOnce() -> Result<(), Failure>,
    {
        OnClose { body: self, f: Some(f) }
    }

    /// Erase the body type.
    fn boxed(self) -> BoxBody
    where
        Self: Sized + 'static,
    {
        Box::new(Boxed(self))
    }
}

/// Type erased [`Body`].
pub type BoxBody = Box<dyn Body<Chunk = Bytes>>;

impl<B: Body + ?Sized> Body for Box<B> {
    type Chunk = B::Chunk;

    #[inline]
    fn next_chunk(&mut self) -> Option<Result<Self::Chunk, Failure>> {
        (**self).next_chunk()
    }

    #[inline]
    fn close(&mut self) -> Result<(), Failure> {
        (**self).close()
    }
}

// ===== IntoChunk =====

/// A value that can be written as a body chunk.
pub trait IntoChunk {
    /// # Errors
    ///
    /// Returns [`Error::Type`] if the value is not a byte string.
    fn into_chunk(self) -> Result<Bytes>;
}

impl IntoChunk for Bytes {
    #[inline]
    fn into_chunk(self) -> Result<Bytes> {
        Ok(self)
    }
}

impl IntoChunk for BytesMut {
    #[inline]
    fn into_chunk(self) -> Result<Bytes> {
        Ok(self.freeze())
    }
}

impl IntoChunk for Vec<u8> {
    #[inline]
    fn into_chunk(self) -> Result<Bytes> {
        Ok(self.into())
    }
}

impl IntoChunk for &'static [u8] {
    #[inline]
    fn into_chunk(self) -> Result<Bytes> {
        Ok(Bytes::from_static(self))
    }
}

impl<const N: usize> IntoChunk for &'static [u8; N] {
    #[inline]
    fn into_chunk(self) -> Result<Bytes> {
        Ok(Bytes::from_static(self))
    }
}

impl IntoChunk for Value {
    fn into_chunk(self) -> Result<Bytes> {
        match self {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(Error::type_mismatch("byte string value", other.type_name())),
        }
    }
}

// ===== Adapters =====

/// Returns body with no chunks.
pub const fn empty() -> Empty {
    Empty { _p: () }
}

/// Returns body with a single chunk.
pub fn once<C: IntoChunk>(chunk: C) -> Once<C> {
    Once { chunk: Some(chunk) }
}

/// Returns body producing each item of an iterator.
pub fn iter<I>(iter: I) -> Iter<I::IntoIter>
where
    I: IntoIterator<Item: IntoChunk>,
{
    Iter { iter: iter.into_iter() }
}

/// Returns body producing each item of a fallible iterator.
pub fn try_iter<I, C>(iter: I) -> TryIter<I::IntoIter>
where
    I: IntoIterator<Item = Result<C, Failure>>,
    C: IntoChunk,
{
    TryIter { iter: iter.into_iter() }
}

#[derive(Debug)]
pub struct Empty {
    _p: (),
}

impl Body for Empty {
    type Chunk = Bytes;

    #[inline]
    fn next_chunk(&mut self) -> Option<Result<Bytes, Failure>> {
        None
    }
}

#[derive(Debug)]
pub struct Once<C> {
    chunk: Option<C>,
}

impl<C: IntoChunk> Body for Once<C> {
    type Chunk = C;

    #[inline]
    fn next_chunk(&mut self) -> Option<Result<C, Failure>> {
        self.chunk.take().map(Ok)
    }
}

#[derive(Debug)]
pub struct Iter<I> {
    iter: I,
}

impl<I> Body for Iter<I>
where
    I: Iterator<Item: IntoChunk>,
{
    type Chunk = I::Item;

    #[inline]
    fn next_chunk(&mut self) -> Option<Result<I::Item, Failure>> {
        self.iter.next().map(Ok)
    }
}

#[derive(Debug)]
pub struct TryIter<I> {
    iter: I,
}

impl<I, C> Body for TryIter<I>
where
    I: Iterator<Item = Result<C, Failure>>,
    C: IntoChunk,
{
    type Chunk = C;

    #[inline]
    fn next_chunk(&mut self) -> Option<Result<C, Failure>> {
        self.iter.next()
    }
}

/// Body returned by [`Body::on_close`].
pub struct OnClose<B, F> {
    body: B,
    f: Option<F>,
}

impl<B, F> Body for OnClose<B, F>
where
    B: Body,
    F: FnOnce() -> Result<(), Failure>,
{
    type Chunk = B::Chunk;

    #[inline]
    fn next_chunk(&mut self) -> Option<Result<B::Chunk, Failure>> {
        self.body.next_chunk()
    }

    fn close(&mut self) -> Result<(), Failure> {
        let closed = self.body.close();
        match self.f.take() {
            Some(f) => closed.and(f()),
            None => closed,
        }
    }
}

impl<B: std::fmt::Debug, F> std::fmt::Debug for OnClose<B, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnClose")
            .field("body", &self.body)
            .field("closed", &self.f.is_none())
            .finish()
    }
}

/// Converts chunks into [`Bytes`], chunk errors are carried as [`Failure`].
struct Boxed<B>(B);

impl<B: Body> Body for Boxed<B> {
    type Chunk = Bytes;

    fn next_chunk(&mut self) -> Option<Result<Bytes, Failure>> {
        let chunk = self.0.next_chunk()?;
        Some(chunk.and_then(|chunk| chunk.into_chunk().map_err(Failure::from)))
    }

    #[inline]
    fn close(&mut self) -> Result<(), Failure> {
        self.0.close()
    }
}
