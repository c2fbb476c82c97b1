//! Single-part upload against a presigned destination.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TransferError;
use crate::chunker::Frame;

/// Request header naming the part number on the wire.
pub const PART_NUMBER_HEADER: &str = "x-part-number";

/// Request header carrying the SHA-256 hex digest of the part body.
pub const CONTENT_DIGEST_HEADER: &str = "x-content-sha256";

/// Outcome of one part write: status plus the integrity token when the
/// destination returned one.
#[derive(Debug, Clone)]
pub struct PartResponse {
    pub status: u16,
    pub integrity_token: Option<String>,
}

/// One entry of the completed-upload manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartResult {
    pub part_number: u32,
    pub integrity_token: String,
}

/// Abstract single-write transport for one part.
///
/// The coordinator talks to this trait, which keeps upload logic decoupled
/// from the HTTP stack and testable with mocks.
pub trait PartTransport: Send + Sync {
    /// Writes `body` to `destination` in a single request and returns the
    /// destination's response.
    fn put_part(
        &self,
        destination: &str,
        headers: &HashMap<String, String>,
        body: &[u8],
    ) -> Pin<Box<dyn Future<Output = Result<PartResponse, TransferError>> + Send + '_>>;
}

/// [`PartTransport`] over HTTP: one `PUT` per part to the presigned URL,
/// integrity token taken from the `ETag` response header.
pub struct HttpPartTransport {
    client: reqwest::Client,
}

impl HttpPartTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Uses a preconfigured client (timeouts, proxies, TLS settings).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpPartTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl PartTransport for HttpPartTransport {
    fn put_part(
        &self,
        destination: &str,
        headers: &HashMap<String, String>,
        body: &[u8],
    ) -> Pin<Box<dyn Future<Output = Result<PartResponse, TransferError>> + Send + '_>> {
        let url = destination.to_string();
        let headers = headers.clone();
        let body = body.to_vec();
        Box::pin(async move {
            let mut req = self.client.put(&url).body(body);
            for (name, value) in &headers {
                req = req.header(name.as_str(), value.as_str());
            }

            let resp = req.send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(TransferError::Transport(format!(
                    "part write to {url} failed with status {status}"
                )));
            }

            let integrity_token = resp
                .headers()
                .get(reqwest::header::ETAG)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim_matches('"').to_string());

            Ok(PartResponse {
                status: status.as_u16(),
                integrity_token,
            })
        })
    }
}

/// Uploads one frame and extracts its integrity token.
///
/// Performs no retry of its own; the coordinator owns the retry budget.
pub struct PartUploader<'a> {
    transport: &'a dyn PartTransport,
}

impl<'a> PartUploader<'a> {
    pub fn new(transport: &'a dyn PartTransport) -> Self {
        Self { transport }
    }

    /// Writes `frame` to `destination` and returns the manifest entry.
    ///
    /// `on_part_progress`, when given, is invoked with `100.0` once the
    /// single write settles — whole-part granularity, nothing finer.
    pub async fn upload(
        &self,
        frame: &Frame,
        destination: &str,
        on_part_progress: Option<&(dyn Fn(f64) + Send + Sync)>,
    ) -> Result<PartResult, TransferError> {
        let mut headers = HashMap::new();
        headers.insert(
            PART_NUMBER_HEADER.to_string(),
            frame.part_number.to_string(),
        );
        headers.insert(CONTENT_DIGEST_HEADER.to_string(), frame.checksum.clone());

        let resp = self
            .transport
            .put_part(destination, &headers, &frame.data)
            .await?;

        if let Some(cb) = on_part_progress {
            cb(100.0);
        }

        let integrity_token = resp.integrity_token.ok_or_else(|| {
            TransferError::Protocol(format!(
                "no integrity token in response for part {}",
                frame.part_number
            ))
        })?;

        debug!(
            part = frame.part_number,
            bytes = frame.data.len(),
            "part uploaded"
        );

        Ok(PartResult {
            part_number: frame.part_number,
            integrity_token,
        })
    }
}
