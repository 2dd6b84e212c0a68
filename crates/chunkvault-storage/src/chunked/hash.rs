//! SHA-256 content digests.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt};

use chunkvault_core::error::{AppError, ErrorKind};
use chunkvault_core::result::AppResult;

const READ_BUFFER: usize = 64 * 1024;

/// Lowercase hex SHA-256 digest of a complete byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Digest of an in-memory buffer.
    pub fn of(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Compare against a stored hex digest, ignoring case.
    pub fn matches(&self, recorded: &str) -> bool {
        self.0.eq_ignore_ascii_case(recorded)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incremental SHA-256 over data fed in arbitrary slices.
#[derive(Debug, Clone, Default)]
pub struct ContentHasher {
    inner: Sha256,
    len: u64,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
        self.len += data.len() as u64;
    }

    /// Number of bytes fed so far.
    pub fn bytes_hashed(&self) -> u64 {
        self.len
    }

    pub fn finalize(self) -> ContentHash {
        ContentHash(hex::encode(self.inner.finalize()))
    }
}

/// Digest a whole stream without splitting it. Returns the digest and the
/// number of bytes read.
pub async fn hash_reader<R>(mut reader: R) -> AppResult<(ContentHash, u64)>
where
    R: AsyncRead + Unpin,
{
    let mut hasher = ContentHasher::new();
    let mut buf = vec![0u8; READ_BUFFER];
    loop {
        let n = reader.read(&mut buf).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read stream for hashing", e)
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let len = hasher.bytes_hashed();
    Ok((hasher.finalize(), len))
}
