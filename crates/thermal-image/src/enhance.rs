//! Automatic enhancement of high-bit-depth thermal captures.
//!
//! Normalizes to 8-bit, then applies adaptive equalization to low-contrast
//! images, denoises noisy ones and rebalances brightness when the mean
//! falls outside an acceptable band.

use std::ops::RangeInclusive;
use std::path::Path;

use image::GrayImage;
use tracing::{debug, warn};

use crate::Result;
use crate::filters::{
    adjust_brightness, equalize_adaptive, gaussian_denoise, laplacian_variance, median_denoise,
};
use crate::intensity::{
    IntensityImage, mean_intensity, normalize_to_u8, std_dev, to_intensity, value_range,
};

/// Thresholds and parameters for [`enhance`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnhanceOptions {
    /// Images whose standard deviation is below this get adaptive equalization.
    pub contrast_threshold: f64,
    /// Normalized clip limit for adaptive equalization.
    pub clip_limit: f64,
    /// Laplacian variance above which the image is considered noisy.
    pub noise_threshold: f64,
    /// Gaussian sigma for the second denoising pass.
    pub blur_sigma: f32,
    /// Mean intensities inside this band are left as-is.
    pub brightness_band: RangeInclusive<f64>,
    /// Mean intensity that brightness correction aims for.
    pub target_mean: f64,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        Self {
            contrast_threshold: 40.0,
            clip_limit: 0.02,
            noise_threshold: 100.0,
            blur_sigma: 1.0,
            brightness_band: 80.0..=180.0,
            target_mean: 128.0,
        }
    }
}

/// Result of [`enhance`]: the 8-bit image and the steps that ran.
#[derive(Debug, Clone)]
pub struct Enhancement {
    pub image: GrayImage,
    pub equalized: bool,
    pub median_filtered: bool,
    pub blurred: bool,
    /// Multiplicative factor applied by brightness correction, if any.
    pub brightness_factor: Option<f64>,
}

/// Run the enhancement pipeline on an intensity plane.
///
/// Steps, in order:
/// 1. min/max normalization to 8-bit (a flat plane returns all zeros here)
/// 2. adaptive equalization if the standard deviation is low
/// 3. median filter if the Laplacian variance is high, then a Gaussian blur
///    if it is still high
/// 4. brightness scaling by `target_mean / mean` if the mean is outside the band
pub fn enhance(plane: &IntensityImage, opts: &EnhanceOptions) -> Result<Enhancement> {
    let (width, height) = plane.dimensions();
    debug!(width, height, "Enhancing image");

    let mut img = normalize_to_u8(plane);
    if let Some((value, _)) = value_range(plane).filter(|&(min, max)| max <= min) {
        warn!(value, "Input image is flat, output will be black");
        return Ok(Enhancement {
            image: img,
            equalized: false,
            median_filtered: false,
            blurred: false,
            brightness_factor: None,
        });
    }

    let mut equalized = false;
    let std = std_dev(&img);
    if std < opts.contrast_threshold {
        debug!(std, threshold = opts.contrast_threshold, "Low contrast, equalizing");
        img = equalize_adaptive(&img, opts.clip_limit);
        equalized = true;
    }

    let mut median_filtered = false;
    let variance = laplacian_variance(&img);
    if variance > opts.noise_threshold {
        debug!(variance, threshold = opts.noise_threshold, "Noisy image, median filtering");
        img = median_denoise(&img);
        median_filtered = true;
    }

    let mut blurred = false;
    let variance = laplacian_variance(&img);
    if variance > opts.noise_threshold {
        debug!(variance, threshold = opts.noise_threshold, "Still noisy, blurring");
        img = gaussian_denoise(&img, opts.blur_sigma)?;
        blurred = true;
    }

    let mut brightness_factor = None;
    let mean = mean_intensity(&img);
    if !opts.brightness_band.contains(&mean) {
        if mean > 0.0 {
            let factor = opts.target_mean / mean;
            debug!(mean, factor, "Mean outside brightness band, rescaling");
            img = adjust_brightness(&img, factor);
            brightness_factor = Some(factor);
        } else {
            warn!("Mean intensity is zero, skipping brightness correction");
        }
    }

    Ok(Enhancement {
        image: img,
        equalized,
        median_filtered,
        blurred,
        brightness_factor,
    })
}

/// Enhance the image at `input` with default options and write it to `output`.
pub fn enhance_image_auto(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    enhance_image_with(input, output, &EnhanceOptions::default())
}

/// Enhance the image at `input` and write the 8-bit single-channel result to `output`.
///
/// Colour inputs are reduced to luma before normalization.
pub fn enhance_image_with(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    opts: &EnhanceOptions,
) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();
    debug!(input = %input.display(), output = %output.display(), "Auto-enhancing image");

    let src = image::open(input)?;
    let result = enhance(&to_intensity(&src), opts)?;
    result.image.save(output)?;
    Ok(())
}
