//! Synthetic thermal palette: cold (blue) to hot (red).

use std::path::Path;

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::map::map_colors;
use tracing::debug;

use crate::Result;
use crate::intensity::{normalize_to_u8, to_intensity};

/// Map each 8-bit intensity `v` to `(v, v / 2, 255 - v)`.
pub fn thermal_palette(gray: &GrayImage) -> RgbImage {
    map_colors(gray, |p| {
        let v = p.0[0];
        Rgb([v, v / 2, 255 - v])
    })
}

/// Render a decoded image with the thermal palette.
///
/// Colour images are reduced to luma, then the intensity range is stretched
/// to 0..255. A flat image maps to all zeros, i.e. pure blue.
pub fn render_thermal(img: &DynamicImage) -> RgbImage {
    let gray = normalize_to_u8(&to_intensity(img));
    thermal_palette(&gray)
}

/// Apply the thermal palette to the image at `input` and write the RGB result to `output`.
pub fn apply_thermal_colormap(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();
    debug!(input = %input.display(), output = %output.display(), "Applying thermal colormap");

    let src = image::open(input)?;
    render_thermal(&src).save(output)?;
    Ok(())
}
