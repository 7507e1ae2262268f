//! Run configuration.
//!
//! [`HashOptions`] is a builder that carries the sampling cadence, raster
//! geometry, progress/cancellation hooks, and debugging options through the
//! pipeline without polluting every function signature.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use vhash::{CancellationToken, HashOptions, RasterGeometry};
//!
//! let token = CancellationToken::new();
//! let options = HashOptions::new()
//!     .with_step(Duration::from_secs(5))
//!     .with_geometry(RasterGeometry { width: 16, height: 16 })
//!     .with_cancellation(token.clone());
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::VhashError;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};
use crate::raster::RasterGeometry;

/// Configuration for a hashing run.
///
/// Defaults: a 2-second sampling step and an 8×8 grayscale raster
/// (16 hex digits per line).
#[derive(Clone)]
pub struct HashOptions {
    /// Media time between consecutive samples.
    pub(crate) step: Duration,
    /// Geometry every sampled frame is scaled to before hashing.
    pub(crate) geometry: RasterGeometry,
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Cancellation token. `None` means never cancelled.
    pub(crate) cancellation: Option<CancellationToken>,
    /// When set, each sampled raster is saved as a PNG into this directory.
    pub(crate) dump_frames: Option<PathBuf>,
}

impl Debug for HashOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("HashOptions")
            .field("step", &self.step)
            .field("geometry", &self.geometry)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("dump_frames", &self.dump_frames)
            .finish_non_exhaustive()
    }
}

impl Default for HashOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl HashOptions {
    /// Create options with the defaults: 2-second step, 8×8 raster.
    pub fn new() -> Self {
        Self {
            step: Duration::from_secs(2),
            geometry: RasterGeometry::default(),
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            dump_frames: None,
        }
    }

    /// Set the media time between consecutive samples.
    #[must_use]
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// Set the raster geometry frames are scaled to before hashing.
    #[must_use]
    pub fn with_geometry(mut self, geometry: RasterGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Attach a progress callback, invoked once per emitted hash.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled the sampling loop stops between samples
    /// and the run winds down cleanly.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Save each sampled raster as `sample_NNNNNN.png` into `directory`.
    ///
    /// Intended for debugging fingerprints; the directory is created if it
    /// does not exist.
    #[must_use]
    pub fn with_frame_dump(mut self, directory: impl Into<PathBuf>) -> Self {
        self.dump_frames = Some(directory.into());
        self
    }

    /// The configured sampling step.
    pub fn step(&self) -> Duration {
        self.step
    }

    /// The configured raster geometry.
    pub fn geometry(&self) -> RasterGeometry {
        self.geometry
    }

    /// Check the options for configuration errors.
    ///
    /// # Errors
    ///
    /// Returns [`VhashError::InvalidStep`] for a zero step and
    /// [`VhashError::InvalidGeometry`] for an unhashable geometry.
    pub fn validate(&self) -> Result<(), VhashError> {
        if self.step.is_zero() {
            return Err(VhashError::InvalidStep);
        }
        self.geometry.validate()
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_two_seconds_and_8x8() {
        let options = HashOptions::new();
        assert_eq!(options.step(), Duration::from_secs(2));
        assert_eq!(options.geometry(), RasterGeometry { width: 8, height: 8 });
        assert!(options.validate().is_ok());
    }

    #[test]
    fn zero_step_is_rejected() {
        let options = HashOptions::new().with_step(Duration::ZERO);
        assert!(matches!(options.validate(), Err(VhashError::InvalidStep)));
    }

    #[test]
    fn unhashable_geometry_is_rejected() {
        let options = HashOptions::new().with_geometry(RasterGeometry {
            width: 5,
            height: 5,
        });
        assert!(matches!(
            options.validate(),
            Err(VhashError::InvalidGeometry { .. })
        ));
    }
}
