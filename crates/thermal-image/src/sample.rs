//! Pixel intensity lookup with coordinate clamping.

use std::path::Path;

use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::intensity::to_intensity;
use crate::{Result, ThermalError};

/// Intensity at `(x, y)`, truncated to an integer.
///
/// Coordinates outside the image are clamped to the nearest edge. Colour
/// images return the luma of the pixel; grayscale images their raw sample
/// (up to 65535 for 16-bit data).
pub fn pixel_value(img: &DynamicImage, x: i64, y: i64) -> Result<u32> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(ThermalError::EmptyImage);
    }

    let cx = x.clamp(0, i64::from(width) - 1) as u32;
    let cy = y.clamp(0, i64::from(height) - 1) as u32;
    if (cx as i64, cy as i64) != (x, y) {
        debug!(x, y, cx, cy, "Clamped sample coordinates");
    }

    let value = to_intensity(img).get_pixel(cx, cy).0[0];
    Ok(value.max(0.0) as u32)
}

/// Read the image at `path` and return the intensity at `(x, y)`.
pub fn get_pixel_value(path: impl AsRef<Path>, x: i64, y: i64) -> Result<u32> {
    let img = image::open(path.as_ref())?;
    pixel_value(&img, x, y)
}
