//! Average-hash reduction of grayscale rasters.
//!
//! The average hash thresholds every pixel of a small grayscale raster
//! against the raster's mean intensity and packs the resulting bits into a
//! lowercase hexadecimal string — a compact fingerprint that is robust to
//! minor visual changes such as re-encoding or mild scaling artifacts.
//!
//! The reduction is pure and uses integer arithmetic only, so identical
//! rasters always produce identical hashes on every platform.
//!
//! # Example
//!
//! ```
//! use vhash::{Raster, RasterGeometry, average_hash};
//!
//! let raster = Raster::from_pixels(RasterGeometry::default(), vec![100_u8; 64])?;
//! // No pixel exceeds the mean, so every nibble is zero.
//! assert_eq!(average_hash(&raster)?, "0000000000000000");
//! # Ok::<(), vhash::VhashError>(())
//! ```

use crate::{error::VhashError, raster::Raster};

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Reduce a grayscale raster to its average-hash hex string.
///
/// The mean intensity is computed with truncating integer division over all
/// pixels. Pixels are then taken in raster-scan order in consecutive groups
/// of 4 — the grouping follows the flattened pixel sequence and does not
/// respect row boundaries when the width is not a multiple of 4. Each group
/// becomes one hex digit: bit 3 for the first pixel down to bit 0 for the
/// fourth, where a bit is set iff the pixel is strictly greater than the
/// mean. Pixels exactly equal to the mean contribute 0.
///
/// An 8×8 raster yields a 16-digit hash.
///
/// # Errors
///
/// Returns [`VhashError::InvalidGeometry`] if the raster's pixel count is
/// zero or not divisible by 4.
pub fn average_hash(raster: &Raster) -> Result<String, VhashError> {
    let pixels = raster.pixels();
    if pixels.is_empty() || pixels.len() % 4 != 0 {
        return Err(VhashError::InvalidGeometry {
            width: raster.width(),
            height: raster.height(),
        });
    }

    let sum: u64 = pixels.iter().map(|&pixel| u64::from(pixel)).sum();
    let mean = (sum / pixels.len() as u64) as u8;

    let mut hash = String::with_capacity(pixels.len() / 4);
    for group in pixels.chunks_exact(4) {
        let nibble = (u8::from(group[0] > mean) << 3)
            | (u8::from(group[1] > mean) << 2)
            | (u8::from(group[2] > mean) << 1)
            | u8::from(group[3] > mean);
        hash.push(HEX_DIGITS[nibble as usize] as char);
    }

    Ok(hash)
}
