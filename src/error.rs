//! Error types for the `vhash` crate.
//!
//! This module defines [`VhashError`], the unified error type returned by all
//! fallible operations in the crate. Variants carry enough context to diagnose
//! the problem without additional logging at the call site.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `vhash` operations.
///
/// Every public method that can fail returns `Result<T, VhashError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VhashError {
    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::MediaSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The hash destination could not be opened for writing.
    #[error("Failed to open hash destination at {path}: {reason}")]
    SinkOpen {
        /// Path that was passed to [`crate::FileSink::create`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded and the condition is not
    /// recoverable by skipping packets.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// The source's frame geometry or pixel format changed mid-stream.
    ///
    /// The hash stream assumes constant geometry across all emitted lines,
    /// so this aborts the whole run.
    #[error("Video geometry changed mid-stream: expected {expected}, got {actual}")]
    GeometryChanged {
        /// Geometry captured when the source was opened.
        expected: String,
        /// Geometry of the offending decoded frame.
        actual: String,
    },

    /// The configured raster geometry cannot be hashed.
    ///
    /// The average hash packs 4 pixels into one hex digit, so the pixel
    /// count must be non-zero and divisible by 4.
    #[error("Invalid raster geometry {width}x{height}: pixel count must be non-zero and divisible by 4")]
    InvalidGeometry {
        /// Configured raster width.
        width: u32,
        /// Configured raster height.
        height: u32,
    },

    /// Raster pixel data does not match the declared geometry.
    #[error("Raster data holds {actual} bytes but the geometry requires {expected}")]
    RasterSizeMismatch {
        /// Pixel count the geometry requires.
        expected: usize,
        /// Length of the supplied pixel data.
        actual: usize,
    },

    /// A sampling step of zero was provided.
    #[error("Sampling step must be greater than zero")]
    InvalidStep,

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while writing the hash stream.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while dumping sampled rasters.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for VhashError {
    fn from(error: FfmpegError) -> Self {
        VhashError::FfmpegError(error.to_string())
    }
}
