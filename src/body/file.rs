use bytes::Bytes;
use std::io::Read;

use super::Body;
use crate::error::Failure;

/// Default [`FileWrapper`] block size.
pub const DEFAULT_BLOCK_SIZE: usize = 8192;

/// Body reading from any [`Read`] in fixed size blocks.
///
/// Each chunk is exactly `block_size` bytes, except the last one. The body is
/// exhausted on the first read that returns no data, it never yields an
/// empty chunk. Closing drops the reader.
pub struct FileWrapper<R> {
    reader: Option<R>,
    block_size: usize,
}

impl<R: Read> FileWrapper<R> {
    /// Wrap reader with [`DEFAULT_BLOCK_SIZE`].
    pub fn new(reader: R) -> Self {
        Self::with_block_size(reader, DEFAULT_BLOCK_SIZE)
    }

    /// Wrap reader with custom block size, zero is treated as one.
    pub fn with_block_size(reader: R, block_size: usize) -> Self {
        Self {
            reader: Some(reader),
            block_size: block_size.max(1),
        }
    }

    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns `true` if the reader has been released.
    pub const fn is_closed(&self) -> bool {
        self.reader.is_none()
    }
}

impl<R: Read> Body for FileWrapper<R> {
    type Chunk = Bytes;

    fn next_chunk(&mut self) -> Option<Result<Bytes, Failure>> {
        let reader = self.reader.as_mut()?;
        let mut buf = Vec::with_capacity(self.block_size);

        match reader.take(self.block_size as u64).read_to_end(&mut buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok(buf.into())),
            Err(err) => Some(Err(err.into())),
        }
    }

    fn close(&mut self) -> Result<(), Failure> {
        self.reader.take();
        Ok(())
    }
}

impl<R> std::fmt::Debug for FileWrapper<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWrapper")
            .field("block_size", &self.block_size)
            .field("closed", &self.reader.is_none())
            .finish()
    }
}
