//! Aggregate progress reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Callback invoked with the aggregate percentage, in `[0, 100]`.
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// Shared byte counter with a monotonic percentage clamp.
///
/// Completing part tasks add their byte counts as they settle; settle order
/// is unrelated to part order, so the raw percentage could regress. The
/// clamp guarantees the reported value never decreases, and
/// [`finish`](Self::finish) emits the final `100` regardless of per-part
/// rounding drift.
pub struct ProgressReporter {
    total: u64,
    uploaded: AtomicU64,
    last_pct: Mutex<f64>,
    callback: Option<ProgressFn>,
}

impl ProgressReporter {
    /// Creates a reporter for a payload of `total` bytes.
    pub fn new(total: u64, callback: Option<ProgressFn>) -> Self {
        Self {
            total,
            uploaded: AtomicU64::new(0),
            last_pct: Mutex::new(0.0),
            callback,
        }
    }

    /// Records `bytes` more uploaded bytes and reports the new percentage.
    pub fn add(&self, bytes: u64) {
        let uploaded = self.uploaded.fetch_add(bytes, Ordering::SeqCst) + bytes;
        let pct = if self.total == 0 {
            100.0
        } else {
            (uploaded as f64 / self.total as f64) * 100.0
        };
        self.report(pct.min(100.0));
    }

    /// Forces the final `100` report.
    pub fn finish(&self) {
        self.report(100.0);
    }

    /// Bytes recorded so far.
    pub fn uploaded_bytes(&self) -> u64 {
        self.uploaded.load(Ordering::SeqCst)
    }

    fn report(&self, pct: f64) {
        // The callback runs under the clamp lock so concurrent completions
        // cannot deliver reports out of order.
        let mut last = self.last_pct.lock().unwrap();
        if pct > *last {
            *last = pct;
        }
        let clamped = *last;
        if let Some(cb) = &self.callback {
            cb(clamped);
        }
    }
}
