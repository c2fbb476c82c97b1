//! Fixed-size framing of an ordered byte source.

use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::TransferError;

/// Computes SHA-256 of `data` and returns the hex-encoded digest.
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// One frame of payload data, numbered from 1 in source order.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Sequential part number, starting at 1.
    pub part_number: u32,
    /// Raw frame data.
    pub data: Vec<u8>,
    /// SHA-256 hex digest of `data`.
    pub checksum: String,
}

/// Splits a single-pass byte source into fixed-size frames.
///
/// Every frame except the last is exactly `chunk_size` bytes; short reads
/// from the source are re-polled until the frame fills or the source ends.
/// Emitted frame lengths sum to the source's total length. The source
/// cannot be rewound — resuming requires a fresh source.
pub struct StreamChunker<R> {
    source: R,
    chunk_size: usize,
    next_part: u32,
    bytes_emitted: u64,
    eof: bool,
}

impl<R: AsyncRead + Unpin> StreamChunker<R> {
    /// Wraps `source`, cutting frames of `chunk_size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn new(source: R, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be at least 1 byte");
        Self {
            source,
            chunk_size,
            next_part: 1,
            bytes_emitted: 0,
            eof: false,
        }
    }

    /// Reads the next frame. Returns `None` once the source is exhausted.
    pub async fn next_frame(&mut self) -> Result<Option<Frame>, TransferError> {
        if self.eof {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.source.read(&mut buf[filled..]).await?;
            if n == 0 {
                self.eof = true;
                break;
            }
            filled += n;
        }

        if filled == 0 {
            return Ok(None);
        }
        buf.truncate(filled);

        let checksum = checksum_bytes(&buf);
        let frame = Frame {
            part_number: self.next_part,
            data: buf,
            checksum,
        };
        self.next_part += 1;
        self.bytes_emitted += filled as u64;
        Ok(Some(frame))
    }

    /// Number of frames emitted so far.
    pub fn frames_emitted(&self) -> u32 {
        self.next_part - 1
    }

    /// Total bytes emitted so far.
    pub fn bytes_emitted(&self) -> u64 {
        self.bytes_emitted
    }
}
