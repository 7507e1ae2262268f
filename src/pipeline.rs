//! The hashing pipeline driver.
//!
//! [`run`] composes a [`FrameSampler`](crate::FrameSampler) over a
//! [`FrameSource`] with a [`HashSink`]: one line per emitted hash, progress
//! callbacks per sample, and an orderly sink flush on both the success and
//! the error path — a fatal mid-stream condition still leaves every line
//! emitted before it in the destination.
//!
//! [`hash_video`] is the convenience entry point used by the CLI.

use std::path::Path;
use std::time::Duration;

use crate::config::HashOptions;
use crate::error::VhashError;
use crate::progress::ProgressTracker;
use crate::sampler::{FrameSampler, estimate_sample_count};
use crate::sink::{FileSink, HashSink};
use crate::source::{FrameSource, MediaSource};

/// Outcome of a completed hashing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of hash lines written.
    pub samples: u64,
    /// Media duration reported by the source.
    pub media_duration: Duration,
}

/// Drive the full pipeline: sample, hash, write lines.
///
/// Iterates the sampler to exhaustion, appending one line per hash. A
/// zero-duration source produces zero lines and succeeds. On a fatal
/// sampling error the sink is still flushed before the error propagates, so
/// the destination holds exactly the lines emitted before the failure.
///
/// # Errors
///
/// Configuration errors from [`HashOptions::validate`], fatal decode and
/// geometry-drift conditions from the sampler, and I/O errors from the sink.
///
/// # Example
///
/// ```no_run
/// use vhash::{FileSink, HashOptions, MediaSource, pipeline};
///
/// let options = HashOptions::new();
/// let mut source = MediaSource::open("input.mp4", options.geometry())?;
/// let mut sink = FileSink::create("hashes.txt")?;
/// let summary = pipeline::run(&mut source, &mut sink, &options)?;
/// println!("wrote {} hashes", summary.samples);
/// # Ok::<(), vhash::VhashError>(())
/// ```
pub fn run<S: FrameSource, K: HashSink>(
    source: &mut S,
    sink: &mut K,
    options: &HashOptions,
) -> Result<RunSummary, VhashError> {
    let media_duration = source.duration();
    let estimated = estimate_sample_count(media_duration, options.step());
    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        (estimated > 0).then_some(estimated),
    );

    let mut samples = 0_u64;
    let sampler = FrameSampler::new(source, options)?;

    for result in sampler {
        let sample = match result {
            Ok(sample) => sample,
            Err(error) => {
                // Keep the lines emitted before the fatal condition.
                let _ = sink.finish();
                return Err(error);
            }
        };

        if let Err(error) = sink.write_line(&sample.hash) {
            let _ = sink.finish();
            return Err(error);
        }

        samples += 1;
        tracker.advance(sample.timestamp);
    }

    sink.finish()?;

    log::info!(
        "Emitted {samples} hash line(s) across {:.2}s of media",
        media_duration.as_secs_f64()
    );

    Ok(RunSummary {
        samples,
        media_duration,
    })
}

/// Hash a video file into a destination file.
///
/// Opens the input with [`MediaSource::open`] at the configured geometry,
/// creates the destination with [`FileSink::create`], and delegates to
/// [`run`]. A file with no video stream fails with
/// [`VhashError::NoVideoStream`] before any output is produced.
///
/// # Example
///
/// ```no_run
/// use vhash::{HashOptions, hash_video};
///
/// let summary = hash_video("input.mp4", "hashes.txt", &HashOptions::new())?;
/// println!("wrote {} hashes", summary.samples);
/// # Ok::<(), vhash::VhashError>(())
/// ```
pub fn hash_video<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &HashOptions,
) -> Result<RunSummary, VhashError> {
    options.validate()?;
    let mut source = MediaSource::open(input, options.geometry())?;
    let mut sink = FileSink::create(output)?;
    run(&mut source, &mut sink, options)
}
