//! Progress reporting and cancellation support.
//!
//! [`ProgressCallback`] lets callers observe the sampling loop (one
//! notification per emitted hash) and [`CancellationToken`] provides
//! cooperative cancellation: the sampler checks the token between samples
//! and winds down cleanly without emitting a partial hash.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vhash::{HashOptions, ProgressCallback, ProgressInfo, hash_video};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             eprintln!("{pct:.1}% complete");
//!         }
//!     }
//! }
//!
//! let options = HashOptions::new().with_progress(Arc::new(PrintProgress));
//! hash_video("input.mp4", "hashes.txt", &options)?;
//! # Ok::<(), vhash::VhashError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// A snapshot of sampling progress.
///
/// Delivered to [`ProgressCallback::on_progress`] once per emitted hash.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// How many hashes have been emitted so far.
    pub current: u64,
    /// Expected total sample count, if the media duration is known.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the run started.
    pub elapsed: Duration,
    /// Media timestamp of the sample just emitted.
    pub timestamp: Option<Duration>,
}

/// Trait for receiving progress updates during a hashing run.
///
/// Implementations must be [`Send`] and [`Sync`]. Progress callbacks are
/// infallible — they observe but cannot halt the run. Use
/// [`CancellationToken`] for cooperative cancellation.
pub trait ProgressCallback: Send + Sync {
    /// Called after each emitted hash.
    fn on_progress(&self, info: &ProgressInfo);
}

/// A no-op implementation that discards all progress notifications.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone the token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from any thread to request
/// cancellation. The sampling loop checks
/// [`is_cancelled`](CancellationToken::is_cancelled) between samples.
///
/// # Example
///
/// ```
/// use vhash::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones of this token observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal helper that tracks timing and emits progress callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: Option<u64>,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: Option<u64>) -> Self {
        Self {
            callback,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one emitted hash and fire the callback.
    pub(crate) fn advance(&mut self, timestamp: Duration) {
        self.current += 1;

        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32) * 100.0);

        self.callback.on_progress(&ProgressInfo {
            current: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
            timestamp: Some(timestamp),
        });
    }
}
