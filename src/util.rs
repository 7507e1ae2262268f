//! Internal helpers for timestamp conversion and pixel-plane copying.

use std::time::Duration;

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Convert a media-time target to a container-level seek timestamp.
///
/// `Input::seek` (via `avformat_seek_file` with `stream_index = -1`) expects
/// timestamps in AV_TIME_BASE units, not the stream time base.
pub(crate) fn duration_to_seek_timestamp(target: Duration) -> i64 {
    (target.as_secs_f64() * f64::from(ffmpeg_sys_next::AV_TIME_BASE)) as i64
}

/// Rescale a PTS in stream time-base units to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * f64::from(time_base.numerator()) / f64::from(time_base.denominator())
}

/// Copy plane 0 of a scaled grayscale frame into `out`, stripping per-row
/// padding.
///
/// FFmpeg frames frequently carry stride padding (stride > width). `out`
/// must hold exactly `width * height` bytes.
pub(crate) fn copy_gray_plane(frame: &VideoFrame, width: u32, height: u32, out: &mut [u8]) {
    let stride = frame.stride(0);
    let row_len = width as usize;
    let data = frame.data(0);

    debug_assert_eq!(out.len(), row_len * height as usize);

    if stride == row_len {
        out.copy_from_slice(&data[..row_len * height as usize]);
    } else {
        for row in 0..height as usize {
            let src = row * stride;
            out[row * row_len..(row + 1) * row_len]
                .copy_from_slice(&data[src..src + row_len]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_timestamp_is_in_microseconds() {
        assert_eq!(duration_to_seek_timestamp(Duration::ZERO), 0);
        assert_eq!(duration_to_seek_timestamp(Duration::from_secs(2)), 2_000_000);
        assert_eq!(
            duration_to_seek_timestamp(Duration::from_millis(1500)),
            1_500_000
        );
    }

    #[test]
    fn pts_conversion_uses_the_time_base_fraction() {
        // 90 kHz clock, common for MPEG transport streams.
        let time_base = Rational::new(1, 90_000);
        assert!((pts_to_seconds(90_000, time_base) - 1.0).abs() < 1e-9);
        assert!((pts_to_seconds(45_000, time_base) - 0.5).abs() < 1e-9);
    }
}
