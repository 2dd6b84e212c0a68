//! Fixed-size chunking of a byte stream.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use chunkvault_core::error::{AppError, ErrorKind};
use chunkvault_core::result::AppResult;

use super::hash::{ContentHash, ContentHasher};

/// Number of chunks a source of `size` bytes splits into.
pub fn expected_parts(size: u64, chunk_size: u64) -> u64 {
    if chunk_size == 0 {
        return 0;
    }
    size.div_ceil(chunk_size)
}

/// One chunk read from the source.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Zero-based position within the source.
    pub seq: u64,
    pub data: Bytes,
}

/// Totals observed once the source is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSummary {
    pub content_hash: ContentHash,
    pub size: u64,
    pub chunks: u64,
}

/// Splits an async byte source into chunks of exactly `chunk_size` bytes,
/// except a shorter final chunk. An empty source yields no chunks. A digest
/// of the whole stream is computed as the chunks are read.
#[derive(Debug)]
pub struct ChunkSplitter<R> {
    reader: R,
    chunk_size: usize,
    hasher: ContentHasher,
    next_seq: u64,
    exhausted: bool,
}

impl<R> ChunkSplitter<R>
where
    R: AsyncRead + Unpin,
{
    /// Create a splitter. `chunk_size` must be non-zero.
    pub fn new(reader: R, chunk_size: u64) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::validation("Chunk size must be greater than zero"));
        }
        let chunk_size = usize::try_from(chunk_size).map_err(|_| {
            AppError::validation(format!("Chunk size {chunk_size} does not fit in memory"))
        })?;
        Ok(Self {
            reader,
            chunk_size,
            hasher: ContentHasher::new(),
            next_seq: 0,
            exhausted: false,
        })
    }

    /// Read the next chunk, or `None` at end of stream.
    pub async fn next_chunk(&mut self) -> AppResult<Option<Chunk>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < self.chunk_size {
            let n = self.reader.read(&mut buf[filled..]).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read chunk {} from source", self.next_seq),
                    e,
                )
            })?;
            if n == 0 {
                self.exhausted = true;
                break;
            }
            filled += n;
        }

        if filled == 0 {
            return Ok(None);
        }

        buf.truncate(filled);
        self.hasher.update(&buf);

        let chunk = Chunk {
            seq: self.next_seq,
            data: Bytes::from(buf),
        };
        self.next_seq += 1;
        debug!(seq = chunk.seq, bytes = chunk.data.len(), "Read chunk");
        Ok(Some(chunk))
    }

    /// Consume the splitter and return the stream totals.
    pub fn finish(self) -> SplitSummary {
        SplitSummary {
            size: self.hasher.bytes_hashed(),
            content_hash: self.hasher.finalize(),
            chunks: self.next_seq,
        }
    }
}
