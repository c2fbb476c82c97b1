//! Bounded-concurrency multipart upload of encrypted payloads.
//!
//! The pipeline pulls fixed-size frames from an ordered byte source
//! ([`StreamChunker`]), gates network writes through a FIFO counting
//! semaphore ([`Semaphore`]), uploads each frame to its presigned
//! destination ([`PartUploader`]) and aggregates the returned integrity
//! tokens into the part manifest required by the remote finalize call
//! ([`UploadCoordinator`]).

mod chunker;
mod coordinator;
mod part;
mod policy;
mod progress;
mod semaphore;

pub use chunker::{Frame, StreamChunker, checksum_bytes};
pub use coordinator::{Destinations, UploadConfig, UploadCoordinator};
pub use part::{
    CONTENT_DIGEST_HEADER, HttpPartTransport, PART_NUMBER_HEADER, PartResponse, PartResult,
    PartTransport, PartUploader,
};
pub use policy::{MAX_PARTS, MIN_PART_SIZE, chunk_size_for, part_size_for};
pub use progress::{ProgressFn, ProgressReporter};
pub use semaphore::{Permit, Semaphore};

/// Default number of frames read ahead and spawned as one batch.
///
/// Batching is a read-ahead buffer only; the semaphore capacity in
/// [`UploadConfig`] is the authoritative bound on concurrent writes.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default number of parts allowed on the wire at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid transfer parameters: {0}")]
    Validation(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("task join error: {0}")]
    Task(String),
}

impl TransferError {
    /// Returns `true` for failures worth retrying against the same part.
    ///
    /// Validation errors are misconfiguration and never retried. A missing
    /// integrity token is classified as a protocol error but retried the
    /// same way transport failures are.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransferError::Transport(_) | TransferError::Http(_) | TransferError::Protocol(_)
        )
    }
}
