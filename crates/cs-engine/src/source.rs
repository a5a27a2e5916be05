//! Chunk source abstraction — the caller owns stream acquisition.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{EngineError, EngineResult};

/// Default read size for [`ReaderChunkSource`].
pub const DEFAULT_CHUNK_BYTES: usize = 64 * 1024;

/// Supplies raw text chunks to the pipeline until exhaustion.
///
/// Chunks need not be line-aligned — the assembler reframes them. A
/// source is consumed in a single forward pass and is not restartable;
/// the caller acquires and closes the underlying stream.
#[async_trait]
pub trait ChunkSource: Send {
    /// Next chunk, or `None` once the stream is exhausted.
    async fn next_chunk(&mut self) -> EngineResult<Option<String>>;
}

/// Reads fixed-size chunks from any tokio reader.
///
/// Holds one chunk in memory at a time. A multi-byte UTF-8 sequence split
/// at a chunk boundary is carried into the next read; invalid bytes are
/// replaced rather than erroring out.
pub struct ReaderChunkSource<R> {
    reader: R,
    buf: Vec<u8>,
    carry: Vec<u8>,
}

impl<R: AsyncRead + Unpin + Send> ReaderChunkSource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_BYTES)
    }

    pub fn with_chunk_size(reader: R, chunk_bytes: usize) -> Self {
        Self {
            reader,
            buf: vec![0; chunk_bytes.max(1)],
            carry: Vec::new(),
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> ChunkSource for ReaderChunkSource<R> {
    async fn next_chunk(&mut self) -> EngineResult<Option<String>> {
        let n = self
            .reader
            .read(&mut self.buf)
            .await
            .map_err(|e| EngineError::Io(e.to_string()))?;

        if n == 0 {
            if self.carry.is_empty() {
                return Ok(None);
            }
            // Truncated trailing sequence at end of stream.
            let tail = String::from_utf8_lossy(&self.carry).into_owned();
            self.carry.clear();
            return Ok(Some(tail));
        }

        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(&self.buf[..n]);

        let chunk = match std::str::from_utf8(&bytes) {
            Ok(s) => s.to_owned(),
            // Incomplete sequence at the end — keep it for the next read.
            Err(e) if e.error_len().is_none() => {
                self.carry = bytes.split_off(e.valid_up_to());
                String::from_utf8_lossy(&bytes).into_owned()
            }
            Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
        };
        Ok(Some(chunk))
    }
}
