//! # vhash
//!
//! Perceptual average-hash fingerprints for video files.
//!
//! `vhash` samples a video at a fixed cadence (every 2 seconds of media time
//! by default), scales each sampled frame down to a small grayscale raster
//! (8×8 by default), and reduces it to a 16-digit hexadecimal average hash.
//! The result is a line-oriented text stream — one hash per sampled frame —
//! suitable as a building block for near-duplicate video detection or
//! scene-change fingerprinting. Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ### Hash a video file
//!
//! ```no_run
//! use vhash::{HashOptions, hash_video};
//!
//! let summary = hash_video("input.mp4", "hashes.txt", &HashOptions::new()).unwrap();
//! println!("wrote {} hash lines", summary.samples);
//! ```
//!
//! ### Iterate samples lazily
//!
//! ```no_run
//! use vhash::{FrameSampler, HashOptions, MediaSource};
//!
//! let options = HashOptions::new();
//! let mut source = MediaSource::open("input.mp4", options.geometry()).unwrap();
//! for result in FrameSampler::new(&mut source, &options).unwrap() {
//!     let sample = result.unwrap();
//!     println!("{:>8.2}s {}", sample.timestamp.as_secs_f64(), sample.hash);
//! }
//! ```
//!
//! ### Hash a raster directly
//!
//! ```
//! use vhash::{Raster, RasterGeometry, average_hash};
//!
//! let raster = Raster::from_pixels(RasterGeometry::default(), vec![100_u8; 64]).unwrap();
//! assert_eq!(average_hash(&raster).unwrap(), "0000000000000000");
//! ```
//!
//! ## Output format
//!
//! UTF-8 text, one line per sampled frame, each line exactly (W×H)/4
//! lowercase hex characters followed by a newline — no header, no
//! timestamps, no trailing metadata. A zero-duration input produces an
//! empty output and succeeds.
//!
//! ## Design
//!
//! - **Sparse sampling** — the sampler seeks forward by the configured step
//!   after every sample instead of decoding every frame.
//! - **Fixed geometry** — raster dimensions are constant for a whole run; a
//!   source whose geometry or pixel format drifts mid-stream aborts the run,
//!   because the output format assumes constant geometry across all lines.
//! - **Single thread of control** — the pipeline is synchronous and
//!   cooperative; cancellation is observed between samples via
//!   [`CancellationToken`].
//! - **One buffer per run** — the grayscale raster is allocated once and
//!   refilled in place for every sample.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod hash;
pub mod pipeline;
pub mod progress;
pub mod raster;
pub mod sampler;
pub mod sink;
pub mod source;
mod util;

pub use config::HashOptions;
pub use error::VhashError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use hash::average_hash;
pub use pipeline::{RunSummary, hash_video, run};
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use raster::{Raster, RasterGeometry};
pub use sampler::{FrameSampler, HashedSample, estimate_sample_count};
pub use sink::{FileSink, HashSink, StdoutSink};
pub use source::{FrameSource, MediaSource};
