//! Multipart transfer orchestration.
//!
//! Pulls frames in source order, spawns them in read-ahead batches, gates
//! actual network writes through the FIFO semaphore, retries each part
//! against its budget and returns the ascending part manifest.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::chunker::{Frame, StreamChunker};
use crate::part::{PartResult, PartTransport, PartUploader};
use crate::policy::part_size_for;
use crate::progress::{ProgressFn, ProgressReporter};
use crate::semaphore::Semaphore;
use crate::{DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, MIN_PART_SIZE, TransferError};

/// Presigned destination per part number, produced by the external
/// initiate-upload call.
pub type Destinations = HashMap<u32, String>;

/// Tuning knobs for one transfer.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Exact payload size in bytes. Must be non-zero.
    pub total_size: u64,
    /// Protocol minimum part size; the final part may be smaller.
    pub min_part_size: u64,
    /// Frames read ahead and spawned as one batch. Buffering only — the
    /// semaphore capacity below is the authoritative concurrency bound.
    pub batch_size: usize,
    /// Parts allowed on the wire at once (semaphore capacity).
    pub concurrency: usize,
    /// Retries per part after the first attempt.
    pub max_retries: u32,
}

impl UploadConfig {
    /// Config for a payload of `total_size` bytes with default knobs.
    pub fn new(total_size: u64) -> Self {
        Self {
            total_size,
            min_part_size: MIN_PART_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: 3,
        }
    }
}

/// Orchestrates a full multipart transfer over a [`PartTransport`].
pub struct UploadCoordinator {
    transport: Arc<dyn PartTransport>,
    config: UploadConfig,
}

impl UploadCoordinator {
    pub fn new(transport: Arc<dyn PartTransport>, config: UploadConfig) -> Self {
        Self { transport, config }
    }

    /// Transfers `source` to the presigned `destinations` and returns the
    /// part manifest, sorted ascending by part number.
    ///
    /// Any single part exhausting its retry budget fails the whole call;
    /// parts already uploaded are not reported back. `progress` receives a
    /// non-decreasing percentage and exactly one final `100` on success.
    pub async fn upload<R>(
        &self,
        source: R,
        destinations: &Destinations,
        progress: Option<ProgressFn>,
    ) -> Result<Vec<PartResult>, TransferError>
    where
        R: AsyncRead + Unpin,
    {
        if self.config.total_size == 0 {
            return Err(TransferError::Validation(
                "total size must be greater than zero".into(),
            ));
        }

        let transfer_id = Uuid::new_v4();
        let part_size = part_size_for(self.config.total_size, self.config.min_part_size);
        let semaphore = Semaphore::new(self.config.concurrency.max(1));
        let reporter = Arc::new(ProgressReporter::new(self.config.total_size, progress));
        let mut chunker = StreamChunker::new(source, part_size as usize);

        info!(
            %transfer_id,
            total = self.config.total_size,
            part_size,
            concurrency = semaphore.capacity(),
            "starting multipart transfer"
        );

        let batch_size = self.config.batch_size.max(1);
        let mut manifest: Vec<PartResult> = Vec::new();
        let mut batch: Vec<JoinHandle<Result<PartResult, TransferError>>> = Vec::new();

        loop {
            let frame = chunker.next_frame().await?;
            let exhausted = frame.is_none();

            if let Some(frame) = frame {
                let Some(destination) = destinations.get(&frame.part_number) else {
                    return Err(TransferError::Validation(format!(
                        "no destination for part {}",
                        frame.part_number
                    )));
                };
                batch.push(self.spawn_part(
                    frame,
                    destination.clone(),
                    Arc::clone(&semaphore),
                    Arc::clone(&reporter),
                ));
            }

            // Launch accumulated tasks together once the batch fills or the
            // source ends, then await them all before reading further.
            if batch.len() >= batch_size || (exhausted && !batch.is_empty()) {
                for joined in join_all(batch.drain(..)).await {
                    let part = joined.map_err(|e| TransferError::Task(e.to_string()))??;
                    manifest.push(part);
                }
            }

            if exhausted {
                break;
            }
        }

        if chunker.bytes_emitted() != self.config.total_size {
            return Err(TransferError::Validation(format!(
                "source ended early: read {} of {} bytes",
                chunker.bytes_emitted(),
                self.config.total_size
            )));
        }

        // Completion order is not part order; the finalize call requires
        // ascending part numbers.
        manifest.sort_by_key(|p| p.part_number);
        reporter.finish();

        info!(%transfer_id, parts = manifest.len(), "multipart transfer complete");
        Ok(manifest)
    }

    fn spawn_part(
        &self,
        frame: Frame,
        destination: String,
        semaphore: Arc<Semaphore>,
        reporter: Arc<ProgressReporter>,
    ) -> JoinHandle<Result<PartResult, TransferError>> {
        let transport = Arc::clone(&self.transport);
        let max_retries = self.config.max_retries;

        tokio::spawn(async move {
            // Held until the task settles; the guard drop returns the permit
            // on success and failure alike.
            let _permit = semaphore.acquire().await;

            let uploader = PartUploader::new(transport.as_ref());
            let part_number = frame.part_number;
            let frame_len = frame.data.len() as u64;
            let mut attempt = 0u32;

            loop {
                match uploader.upload(&frame, &destination, None).await {
                    Ok(result) => {
                        reporter.add(frame_len);
                        debug!(part = part_number, attempt, "part committed");
                        return Ok(result);
                    }
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        attempt += 1;
                        warn!(
                            part = part_number,
                            attempt,
                            error = %e,
                            "part upload failed, retrying"
                        );
                    }
                    Err(e) => {
                        error!(part = part_number, error = %e, "part upload failed");
                        return Err(e);
                    }
                }
            }
        })
    }
}
