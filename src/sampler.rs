//! Lazy, pull-based frame sampling.
//!
//! [`FrameSampler`] implements [`Iterator`] and walks the media timeline at a
//! fixed cadence: seek to the cursor, decode one raster, hash it, advance the
//! cursor by the configured step. It deliberately skips everything between
//! sample points — sparse sampling trades completeness for throughput.
//!
//! # Example
//!
//! ```no_run
//! use vhash::{FrameSampler, HashOptions, MediaSource};
//!
//! let options = HashOptions::new();
//! let mut source = MediaSource::open("input.mp4", options.geometry())?;
//! for result in FrameSampler::new(&mut source, &options)? {
//!     let sample = result?;
//!     println!("{:?} {}", sample.timestamp, sample.hash);
//! }
//! # Ok::<(), vhash::VhashError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::GrayImage;

use crate::config::HashOptions;
use crate::error::VhashError;
use crate::hash::average_hash;
use crate::progress::CancellationToken;
use crate::raster::{Raster, RasterGeometry};
use crate::source::FrameSource;

/// One emitted fingerprint: the sample's media timestamp and its hash line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedSample {
    /// Media time the sample was taken at.
    pub timestamp: Duration,
    /// Lowercase hex average hash of the sampled raster.
    pub hash: String,
}

/// Upper bound on the number of samples a run can emit.
///
/// With duration `D` and step `S`, samples are taken at `0, S, 2S, …` while
/// the cursor stays below `D`, so the count is `ceil(D / S)`.
pub fn estimate_sample_count(duration: Duration, step: Duration) -> u64 {
    if step.is_zero() {
        return 0;
    }
    duration.as_nanos().div_ceil(step.as_nanos()) as u64
}

/// A lazy iterator over `(timestamp, hash)` samples.
///
/// The sampler borrows the underlying [`FrameSource`] mutably for its whole
/// lifetime. Each call to [`next()`](Iterator::next) performs one
/// seek-decode-hash round; after yielding an error the iterator is fused.
///
/// A stream of zero duration, or one whose very first seek fails, yields the
/// empty sequence — that is a valid result, not an error.
pub struct FrameSampler<'a, S: FrameSource> {
    source: &'a mut S,
    cursor: Duration,
    step: Duration,
    geometry: RasterGeometry,
    duration: Duration,
    cancellation: Option<CancellationToken>,
    dump_directory: Option<PathBuf>,
    samples_emitted: u64,
    done: bool,
}

impl<'a, S: FrameSource> FrameSampler<'a, S> {
    /// Create a sampler over `source` with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`VhashError::InvalidStep`] or [`VhashError::InvalidGeometry`]
    /// for unusable options, and [`VhashError::IoError`] if the frame-dump
    /// directory cannot be created.
    pub fn new(source: &'a mut S, options: &HashOptions) -> Result<Self, VhashError> {
        options.validate()?;

        if let Some(directory) = &options.dump_frames {
            fs::create_dir_all(directory)?;
        }

        let duration = source.duration();
        Ok(Self {
            source,
            cursor: Duration::ZERO,
            step: options.step,
            geometry: options.geometry,
            duration,
            cancellation: options.cancellation.clone(),
            dump_directory: options.dump_frames.clone(),
            samples_emitted: 0,
            done: false,
        })
    }

    /// Number of samples emitted so far.
    pub fn samples_emitted(&self) -> u64 {
        self.samples_emitted
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}

impl<S: FrameSource> Iterator for FrameSampler<'_, S> {
    type Item = Result<HashedSample, VhashError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // Cooperative stop, observed between samples only.
        if self.is_cancelled() {
            log::debug!("Sampling cancelled after {} sample(s)", self.samples_emitted);
            self.done = true;
            return None;
        }

        if self.cursor >= self.duration {
            self.done = true;
            return None;
        }

        let timestamp = self.cursor;

        if let Err(error) = self.source.seek(timestamp) {
            // A failed seek is indistinguishable from running off the end of
            // the stream; the sequence simply ends here.
            log::debug!("Seek to {timestamp:?} failed ({error}); ending sample sequence");
            self.done = true;
            return None;
        }

        let raster = match self.source.next_raster() {
            Ok(Some(raster)) => raster,
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(error) => {
                self.done = true;
                return Some(Err(error));
            }
        };

        // The hash stream assumes one fixed geometry; a source that starts
        // serving different rasters mid-run invalidates every line after it.
        if raster.geometry() != self.geometry {
            self.done = true;
            return Some(Err(VhashError::GeometryChanged {
                expected: format!("{}x{}", self.geometry.width, self.geometry.height),
                actual: format!("{}x{}", raster.width(), raster.height()),
            }));
        }

        if let Some(directory) = &self.dump_directory {
            if let Err(error) = dump_raster(directory, self.samples_emitted, raster) {
                self.done = true;
                return Some(Err(error));
            }
        }

        match average_hash(raster) {
            Ok(hash) => {
                self.cursor += self.step;
                self.samples_emitted += 1;
                Some(Ok(HashedSample { timestamp, hash }))
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

/// Save one sampled raster as a grayscale PNG for fingerprint debugging.
fn dump_raster(directory: &Path, index: u64, raster: &Raster) -> Result<(), VhashError> {
    let image = GrayImage::from_raw(raster.width(), raster.height(), raster.pixels().to_vec())
        .ok_or(VhashError::RasterSizeMismatch {
            expected: raster.geometry().pixel_count(),
            actual: raster.pixels().len(),
        })?;
    image.save(directory.join(format!("sample_{index:06}.png")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_count_estimate_is_ceil_of_duration_over_step() {
        let step = Duration::from_secs(2);
        assert_eq!(estimate_sample_count(Duration::ZERO, step), 0);
        assert_eq!(estimate_sample_count(Duration::from_secs(10), step), 5);
        assert_eq!(estimate_sample_count(Duration::from_secs(9), step), 5);
        assert_eq!(estimate_sample_count(Duration::from_millis(100), step), 1);
        assert_eq!(estimate_sample_count(Duration::from_secs(10), Duration::ZERO), 0);
    }
}
