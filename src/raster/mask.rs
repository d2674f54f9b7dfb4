use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};

use crate::error::{RasterError, Result};
use crate::persistence::file::write_atomically;

/// Red channel: lane id and flags.
pub const CHANNEL_R: usize = 0;
/// Green channel: road-marking bit plus lane classes or boundary id.
pub const CHANNEL_G: usize = 1;
/// Blue channel: vanishing point plus lane colour.
pub const CHANNEL_B: usize = 2;

/// Set on a line byte when the scanline lies inside an occlusion interval.
pub const FLAG_OCCLUDED: u8 = 128;
/// Set on a lane id byte when the scanline lies below the lane's last point.
pub const FLAG_EXTENDED: u8 = 64;
/// Set on a boundary id byte when the scanline is occluded.
pub const FLAG_BOUNDARY_OCCLUDED: u8 = 64;
/// Green bit marking a road-marking pixel.
pub const ROAD_MARKING_BIT: u8 = 128;

/// Blue value of every pixel when the image has no vanishing point.
pub const VP_ABSENT: u8 = 64;
/// Blue value inside the vanishing-point box.
pub const VP_INSIDE: u8 = 128;

/// A three-channel label image, initially all zero.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMask {
    image: RgbImage,
}

impl LabelMask {
    /// Creates a zeroed mask.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::InvalidDimensions`] if either side is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidDimensions { width, height }.into());
        }
        Ok(Self {
            image: RgbImage::new(width, height),
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel at `(x, y)` as `[r, g, b]`, or `None` outside the mask.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    pub(crate) fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut Rgb<u8>> {
        self.image.get_pixel_mut_checked(x, y)
    }

    pub(crate) fn pixels_mut(&mut self) -> impl Iterator<Item = &mut Rgb<u8>> {
        self.image.pixels_mut()
    }

    #[must_use]
    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    /// Writes the mask as a 24-bit PNG, replacing `path` only once fully written.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::Image`] if encoding fails and
    /// [`RasterError::Io`] if writing fails.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|source| RasterError::Image {
                path: path.to_path_buf(),
                source,
            })?;
        write_atomically(path, &bytes).map_err(|source| RasterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}
