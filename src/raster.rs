//! Fixed-geometry grayscale rasters.
//!
//! Every sampled frame is scaled down to one small single-channel grid — a
//! [`Raster`] — before hashing. The geometry is fixed for the lifetime of a
//! run: the [`MediaSource`](crate::MediaSource) allocates one raster at open
//! time and refills it for every sample, so steady-state operation performs
//! no per-frame allocation.

use crate::error::VhashError;

/// Dimensions of the downscaled raster every sampled frame is reduced to.
///
/// The default is 8×8, which hashes to 16 hex digits. Any geometry whose
/// pixel count is non-zero and divisible by 4 is accepted; see
/// [`RasterGeometry::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterGeometry {
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
}

impl RasterGeometry {
    /// Total number of pixels in a raster of this geometry.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of hex digits in the hash of a raster of this geometry.
    ///
    /// One digit per group of 4 pixels.
    pub fn hash_len(&self) -> usize {
        self.pixel_count() / 4
    }

    /// Check that this geometry can be hashed.
    ///
    /// # Errors
    ///
    /// Returns [`VhashError::InvalidGeometry`] if the pixel count is zero or
    /// not divisible by 4.
    pub fn validate(&self) -> Result<(), VhashError> {
        let pixels = self.pixel_count();
        if pixels == 0 || pixels % 4 != 0 {
            return Err(VhashError::InvalidGeometry {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl Default for RasterGeometry {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
        }
    }
}

/// An owned single-channel pixel grid.
///
/// Pixels are stored row-major, one byte per pixel (0–255 intensity).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    geometry: RasterGeometry,
    data: Vec<u8>,
}

impl Raster {
    /// Allocate a zeroed raster of the given geometry.
    pub fn new(geometry: RasterGeometry) -> Self {
        Self {
            data: vec![0; geometry.pixel_count()],
            geometry,
        }
    }

    /// Build a raster from existing pixel data.
    ///
    /// # Errors
    ///
    /// Returns [`VhashError::RasterSizeMismatch`] if `pixels` does not hold
    /// exactly `geometry.pixel_count()` bytes.
    pub fn from_pixels(
        geometry: RasterGeometry,
        pixels: impl Into<Vec<u8>>,
    ) -> Result<Self, VhashError> {
        let data = pixels.into();
        if data.len() != geometry.pixel_count() {
            return Err(VhashError::RasterSizeMismatch {
                expected: geometry.pixel_count(),
                actual: data.len(),
            });
        }
        Ok(Self { geometry, data })
    }

    /// The raster's geometry.
    pub fn geometry(&self) -> RasterGeometry {
        self.geometry
    }

    /// Raster width in pixels.
    pub fn width(&self) -> u32 {
        self.geometry.width
    }

    /// Raster height in pixels.
    pub fn height(&self) -> u32 {
        self.geometry.height
    }

    /// The pixel data in row-major order.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the pixel data, for refilling the buffer in place.
    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry_is_8x8() {
        let geometry = RasterGeometry::default();
        assert_eq!(geometry.pixel_count(), 64);
        assert_eq!(geometry.hash_len(), 16);
        assert!(geometry.validate().is_ok());
    }

    #[test]
    fn indivisible_pixel_count_is_rejected() {
        let geometry = RasterGeometry {
            width: 3,
            height: 3,
        };
        assert!(matches!(
            geometry.validate(),
            Err(VhashError::InvalidGeometry {
                width: 3,
                height: 3
            })
        ));
    }

    #[test]
    fn zero_area_is_rejected() {
        let geometry = RasterGeometry {
            width: 0,
            height: 8,
        };
        assert!(geometry.validate().is_err());
    }

    #[test]
    fn from_pixels_checks_length() {
        let geometry = RasterGeometry::default();
        assert!(Raster::from_pixels(geometry, vec![0_u8; 64]).is_ok());
        assert!(matches!(
            Raster::from_pixels(geometry, vec![0_u8; 63]),
            Err(VhashError::RasterSizeMismatch {
                expected: 64,
                actual: 63
            })
        ));
    }
}
