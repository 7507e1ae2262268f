//! Frame acquisition.
//!
//! This module defines [`FrameSource`], the seam between the sampling loop
//! and whatever produces decoded grayscale rasters, and [`MediaSource`], the
//! production implementation backed by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! A `MediaSource` owns the demuxer, the video decoder, one scaling context
//! (source format → GRAY8 at the configured raster geometry), and a single
//! reusable raster buffer. All of it is released via RAII when the source is
//! dropped, on every exit path.

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};

use crate::error::VhashError;
use crate::raster::{Raster, RasterGeometry};
use crate::util;

/// Give up on a sample target after this many consecutive packet-level
/// failures; past that the condition is no longer transient.
const MAX_CONSECUTIVE_FAILURES: u32 = 64;

/// A source of decoded, grayscale, fixed-geometry rasters.
///
/// The sampling loop drives a `FrameSource` through monotonically increasing
/// seek targets, pulling one raster per target. Production code uses
/// [`MediaSource`]; tests substitute mock implementations.
pub trait FrameSource {
    /// Total media duration. Zero if the container does not report one.
    fn duration(&self) -> Duration;

    /// Position the decode cursor at (or before) `target`.
    ///
    /// Approximate seeking to the nearest frame boundary at or before the
    /// target is acceptable; exact-frame positioning is not required.
    fn seek(&mut self, target: Duration) -> Result<(), VhashError>;

    /// Decode and return the next raster at or after the seek position.
    ///
    /// Returns `Ok(None)` once the stream is exhausted. The returned
    /// reference may point into a buffer that is overwritten by the next
    /// call.
    fn next_raster(&mut self) -> Result<Option<&Raster>, VhashError>;
}

/// FFmpeg-backed frame source.
///
/// Opens a media file, locates the best video stream, and serves one
/// grayscale raster per seek target, scaled to the configured geometry.
///
/// # Example
///
/// ```no_run
/// use vhash::{FrameSource, MediaSource, RasterGeometry};
///
/// let source = MediaSource::open("input.mp4", RasterGeometry::default())?;
/// println!("duration: {:?}", source.duration());
/// # Ok::<(), vhash::VhashError>(())
/// ```
pub struct MediaSource {
    input: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    time_base: Rational,
    duration: Duration,
    /// Source geometry captured at open; decoded frames must keep matching it.
    source_width: u32,
    source_height: u32,
    source_format: Pixel,
    decoded_frame: VideoFrame,
    scaled_frame: VideoFrame,
    raster: Raster,
    eof_sent: bool,
}

impl MediaSource {
    /// Open a media file and prepare it for sampling.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, locates the best
    /// video stream, builds a decoder and a GRAY8 scaler for the requested
    /// raster geometry, and allocates the single raster buffer reused across
    /// samples.
    ///
    /// # Errors
    ///
    /// - [`VhashError::InvalidGeometry`] if `geometry` cannot be hashed.
    /// - [`VhashError::FileOpen`] if the file cannot be opened.
    /// - [`VhashError::NoVideoStream`] if no video stream exists.
    /// - [`VhashError::FfmpegError`] if decoder or scaler setup fails.
    pub fn open<P: AsRef<Path>>(path: P, geometry: RasterGeometry) -> Result<Self, VhashError> {
        geometry.validate()?;

        let path = path.as_ref();
        let display_path = path.to_path_buf();

        log::debug!("Opening media file: {}", display_path.display());

        ffmpeg_next::init().map_err(|error| VhashError::FileOpen {
            path: display_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| VhashError::FileOpen {
            path: display_path.clone(),
            reason: error.to_string(),
        })?;

        let (video_stream_index, time_base, decoder) = {
            let stream = input
                .streams()
                .best(Type::Video)
                .ok_or(VhashError::NoVideoStream)?;
            let decoder_context = CodecContext::from_parameters(stream.parameters())?;
            (
                stream.index(),
                stream.time_base(),
                decoder_context.decoder().video()?,
            )
        };

        let source_width = decoder.width();
        let source_height = decoder.height();
        let source_format = decoder.format();

        let scaler = ScalingContext::get(
            source_format,
            source_width,
            source_height,
            Pixel::GRAY8,
            geometry.width,
            geometry.height,
            ScalingFlags::BILINEAR,
        )?;

        // Container duration is reported in AV_TIME_BASE units (microseconds).
        let duration_microseconds = input.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let codec_name = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        log::info!(
            "Opened {}: {}x{} [{}], duration {:.2}s, hashing at {}x{}",
            display_path.display(),
            source_width,
            source_height,
            codec_name,
            duration.as_secs_f64(),
            geometry.width,
            geometry.height,
        );

        Ok(Self {
            input,
            decoder,
            scaler,
            video_stream_index,
            time_base,
            duration,
            source_width,
            source_height,
            source_format,
            decoded_frame: VideoFrame::empty(),
            scaled_frame: VideoFrame::empty(),
            raster: Raster::new(geometry),
            eof_sent: false,
        })
    }

    /// The raster geometry every served frame is scaled to.
    pub fn geometry(&self) -> RasterGeometry {
        self.raster.geometry()
    }

    /// Reject decoded frames whose geometry or pixel format drifted from the
    /// values captured at open. The scaler and the output contract both
    /// assume constant geometry for the whole run.
    fn check_source_geometry(&self) -> Result<(), VhashError> {
        let (width, height, format) = (
            self.decoded_frame.width(),
            self.decoded_frame.height(),
            self.decoded_frame.format(),
        );
        if width != self.source_width || height != self.source_height || format != self.source_format
        {
            return Err(VhashError::GeometryChanged {
                expected: format!(
                    "{}x{} {:?}",
                    self.source_width, self.source_height, self.source_format
                ),
                actual: format!("{width}x{height} {format:?}"),
            });
        }
        Ok(())
    }
}

impl FrameSource for MediaSource {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn seek(&mut self, target: Duration) -> Result<(), VhashError> {
        let timestamp = util::duration_to_seek_timestamp(target);
        self.input.seek(timestamp, ..timestamp)?;
        // Drop frames buffered from before the seek.
        self.decoder.flush();
        self.eof_sent = false;
        Ok(())
    }

    fn next_raster(&mut self) -> Result<Option<&Raster>, VhashError> {
        let mut consecutive_failures = 0_u32;

        loop {
            // Drain any frame the decoder has already produced.
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                self.check_source_geometry()?;
                self.scaler.run(&self.decoded_frame, &mut self.scaled_frame)?;

                let geometry = self.raster.geometry();
                util::copy_gray_plane(
                    &self.scaled_frame,
                    geometry.width,
                    geometry.height,
                    self.raster.pixels_mut(),
                );

                if let Some(pts) = self.decoded_frame.pts() {
                    log::debug!(
                        "Decoded frame at {:.3}s",
                        util::pts_to_seconds(pts, self.time_base)
                    );
                }

                return Ok(Some(&self.raster));
            }

            if self.eof_sent {
                return Ok(None);
            }

            // Feed the decoder more packets.
            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() != self.video_stream_index {
                        continue;
                    }
                    match self.decoder.send_packet(&packet) {
                        Ok(()) => consecutive_failures = 0,
                        Err(error) => {
                            // Individual undecodable packets are skipped;
                            // only a sustained run of them is fatal.
                            consecutive_failures += 1;
                            log::warn!("Skipping undecodable packet: {error}");
                            if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                                return Err(VhashError::VideoDecodeError(format!(
                                    "No frame produced after {MAX_CONSECUTIVE_FAILURES} \
                                     consecutive packet failures: {error}"
                                )));
                            }
                        }
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    consecutive_failures += 1;
                    log::warn!("Skipping unreadable packet: {error}");
                    if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                        return Err(VhashError::VideoDecodeError(format!(
                            "No frame produced after {MAX_CONSECUTIVE_FAILURES} \
                             consecutive read failures: {error}"
                        )));
                    }
                }
            }
        }
    }
}
