//! Single-channel intensity planes and the 8-bit normalization shared by
//! the enhancement and colormap paths.

use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Pixel};
use tracing::debug;

use crate::LUMA_WEIGHTS;

/// Single-channel raster holding raw sample values as `f64`.
///
/// Grayscale sources keep their native scale (0..255 for 8-bit, 0..65535 for
/// 16-bit); colour sources hold the luma of their raw samples.
pub type IntensityImage = ImageBuffer<Luma<f64>, Vec<f64>>;

/// Reduce a decoded image to one intensity channel.
///
/// Images with three or more channels are combined with [`LUMA_WEIGHTS`];
/// an alpha channel, if present, is ignored.
pub fn to_intensity(img: &DynamicImage) -> IntensityImage {
    match img {
        DynamicImage::ImageLuma8(buf) => plane_from(buf),
        DynamicImage::ImageLumaA8(buf) => plane_from(buf),
        DynamicImage::ImageRgb8(buf) => plane_from(buf),
        DynamicImage::ImageRgba8(buf) => plane_from(buf),
        DynamicImage::ImageLuma16(buf) => plane_from(buf),
        DynamicImage::ImageLumaA16(buf) => plane_from(buf),
        DynamicImage::ImageRgb16(buf) => plane_from(buf),
        DynamicImage::ImageRgba16(buf) => plane_from(buf),
        DynamicImage::ImageRgb32F(buf) => plane_from(buf),
        DynamicImage::ImageRgba32F(buf) => plane_from(buf),
        other => plane_from(&other.to_rgba32f()),
    }
}

fn plane_from<P>(buf: &ImageBuffer<P, Vec<P::Subpixel>>) -> IntensityImage
where
    P: Pixel,
    P::Subpixel: Into<f64>,
{
    let (width, height) = buf.dimensions();
    let mut plane = IntensityImage::new(width, height);
    for (x, y, pixel) in buf.enumerate_pixels() {
        plane.put_pixel(x, y, Luma([channel_intensity(pixel.channels())]));
    }
    plane
}

/// Intensity of one pixel's channels: luma for colour, the sample itself otherwise.
fn channel_intensity<S: Copy + Into<f64>>(channels: &[S]) -> f64 {
    if channels.len() >= 3 {
        channels[0].into() * LUMA_WEIGHTS[0]
            + channels[1].into() * LUMA_WEIGHTS[1]
            + channels[2].into() * LUMA_WEIGHTS[2]
    } else {
        channels[0].into()
    }
}

/// Whether the decoded image stores more than 8 bits per sample.
pub fn is_high_bit_depth(img: &DynamicImage) -> bool {
    let color = img.color();
    color.bytes_per_pixel() > color.channel_count()
}

/// Smallest and largest sample of the plane, or `None` if it has no pixels.
pub fn value_range(plane: &IntensityImage) -> Option<(f64, f64)> {
    plane.pixels().map(|p| p.0[0]).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Linearly rescale the plane so its minimum maps to 0 and its maximum to 255.
///
/// Values are truncated toward zero. A flat plane (max == min) produces an
/// all-zero image.
pub fn normalize_to_u8(plane: &IntensityImage) -> GrayImage {
    let (width, height) = plane.dimensions();
    let Some((min, max)) = value_range(plane) else {
        return GrayImage::new(width, height);
    };
    if max <= min {
        debug!(width, height, min, "Flat intensity plane, normalizing to zeros");
        return GrayImage::new(width, height);
    }

    debug!(width, height, min, max, "Normalizing intensity plane to 8-bit");
    let span = max - min;
    GrayImage::from_fn(width, height, |x, y| {
        let v = plane.get_pixel(x, y).0[0];
        Luma([((v - min) / span * 255.0) as u8])
    })
}

/// Mean sample value of an 8-bit image; 0.0 for an empty image.
pub fn mean_intensity(img: &GrayImage) -> f64 {
    let n = img.as_raw().len();
    if n == 0 {
        return 0.0;
    }
    img.as_raw().iter().map(|&v| f64::from(v)).sum::<f64>() / n as f64
}

/// Population standard deviation of an 8-bit image; 0.0 for an empty image.
pub fn std_dev(img: &GrayImage) -> f64 {
    let n = img.as_raw().len();
    if n == 0 {
        return 0.0;
    }
    let mean = mean_intensity(img);
    let var = img
        .as_raw()
        .iter()
        .map(|&v| {
            let d = f64::from(v) - mean;
            d * d
        })
        .sum::<f64>()
        / n as f64;
    var.sqrt()
}

/// Mean over every channel sample of a decoded image, alpha included.
///
/// Unlike [`to_intensity`] this does not weight colour channels, so an RGB
/// pixel contributes `(r + g + b) / 3`. Returns 0.0 for an empty image.
pub fn sample_mean(img: &DynamicImage) -> f64 {
    match img {
        DynamicImage::ImageLuma8(buf) => raw_mean(buf.as_raw()),
        DynamicImage::ImageLumaA8(buf) => raw_mean(buf.as_raw()),
        DynamicImage::ImageRgb8(buf) => raw_mean(buf.as_raw()),
        DynamicImage::ImageRgba8(buf) => raw_mean(buf.as_raw()),
        DynamicImage::ImageLuma16(buf) => raw_mean(buf.as_raw()),
        DynamicImage::ImageLumaA16(buf) => raw_mean(buf.as_raw()),
        DynamicImage::ImageRgb16(buf) => raw_mean(buf.as_raw()),
        DynamicImage::ImageRgba16(buf) => raw_mean(buf.as_raw()),
        DynamicImage::ImageRgb32F(buf) => raw_mean(buf.as_raw()),
        DynamicImage::ImageRgba32F(buf) => raw_mean(buf.as_raw()),
        other => raw_mean(other.to_rgba32f().as_raw()),
    }
}

fn raw_mean<S: Copy + Into<f64>>(samples: &[S]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&v| v.into()).sum::<f64>() / samples.len() as f64
}
