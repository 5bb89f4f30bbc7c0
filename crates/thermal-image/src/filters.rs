//! Denoising, contrast and brightness kernels for 8-bit grayscale images.
//!
//! Thin wrappers over `imageproc` filters plus a contrast-limited adaptive
//! histogram equalization (CLAHE).

use image::{GrayImage, Luma};
use imageproc::filter::{gaussian_blur_f32, laplacian_filter, median_filter};
use imageproc::map::map_colors;
use tracing::debug;

use crate::{Result, ThermalError};

/// Number of histogram bins used by adaptive equalization.
const NBINS: usize = 256;

/// Number of tiles along each axis for adaptive equalization.
const TILES_PER_AXIS: u32 = 8;

/// Population variance of the 3x3 Laplacian response.
///
/// Samples are taken on the unit scale (`v / 255`), so the response of an
/// 8-bit image stays within `[-4, 4]` and the variance within `[0, 16]`.
/// Returns 0.0 for an empty image.
pub fn laplacian_variance(img: &GrayImage) -> f64 {
    let response = laplacian_filter(img);
    let n = response.as_raw().len();
    if n == 0 {
        return 0.0;
    }

    let (sum, sum_sq) = response
        .as_raw()
        .iter()
        .fold((0.0f64, 0.0f64), |(s, sq), &v| {
            let v = f64::from(v) / 255.0;
            (s + v, sq + v * v)
        });
    let mean = sum / n as f64;
    (sum_sq / n as f64 - mean * mean).max(0.0)
}

/// 3x3 median filter.
pub fn median_denoise(img: &GrayImage) -> GrayImage {
    debug!(width = img.width(), height = img.height(), "Applying median filter");
    median_filter(img, 1, 1)
}

/// Gaussian blur with the given standard deviation.
pub fn gaussian_denoise(img: &GrayImage, sigma: f32) -> Result<GrayImage> {
    if sigma.is_nan() || sigma <= 0.0 {
        return Err(ThermalError::InvalidOption(format!(
            "blur sigma must be positive, got {sigma}"
        )));
    }
    debug!(sigma, "Applying Gaussian blur");
    Ok(gaussian_blur_f32(img, sigma))
}

/// Multiplicative brightness enhancement.
///
/// Each sample becomes `v * factor`, truncated and clipped to 0..=255.
/// A factor of 1.0 returns an identical image, 0.0 a black one.
pub fn adjust_brightness(img: &GrayImage, factor: f64) -> GrayImage {
    debug!(factor, "Adjusting brightness");
    map_colors(img, |p| {
        let v = (f64::from(p.0[0]) * factor).clamp(0.0, 255.0);
        Luma([v as u8])
    })
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into tiles of 1/8 of each dimension. Each tile gets a
/// clipped histogram (clip count `max(1, clip_limit * tile_pixels)`, excess
/// spread over all bins) and a CDF lookup table. Pixels take the bilinear
/// blend of the four nearest tile mappings, giving a value in [0, 1] which
/// is scaled back to 8-bit by truncation.
pub fn equalize_adaptive(img: &GrayImage, clip_limit: f64) -> GrayImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return img.clone();
    }

    let tile_w = (width / TILES_PER_AXIS).max(1);
    let tile_h = (height / TILES_PER_AXIS).max(1);
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);
    debug!(
        width,
        height, tile_w, tile_h, tiles_x, tiles_y, clip_limit, "Applying adaptive equalization"
    );

    let clip_count = (clip_limit * f64::from(tile_w * tile_h)).max(1.0) as u32;

    let luts: Vec<[f64; NBINS]> = (0..tiles_y)
        .flat_map(|ty| (0..tiles_x).map(move |tx| (tx, ty)))
        .map(|(tx, ty)| {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            tile_lut(img, x0, y0, x1, y1, clip_count)
        })
        .collect();
    let lut_at = |tx: u32, ty: u32| &luts[(ty * tiles_x + tx) as usize];

    GrayImage::from_fn(width, height, |x, y| {
        let (tx0, tx1, wx) = tile_coords(x, tile_w, tiles_x);
        let (ty0, ty1, wy) = tile_coords(y, tile_h, tiles_y);
        let v = img.get_pixel(x, y).0[0] as usize;

        let top = lut_at(tx0, ty0)[v] * (1.0 - wx) + lut_at(tx1, ty0)[v] * wx;
        let bottom = lut_at(tx0, ty1)[v] * (1.0 - wx) + lut_at(tx1, ty1)[v] * wx;
        let equalized = top * (1.0 - wy) + bottom * wy;

        Luma([(equalized * 255.0).clamp(0.0, 255.0) as u8])
    })
}

/// Neighbouring tile indices and the interpolation weight toward the second.
fn tile_coords(pos: u32, tile_size: u32, tiles: u32) -> (u32, u32, f64) {
    let last = f64::from(tiles - 1);
    let f = ((f64::from(pos) + 0.5) / f64::from(tile_size) - 0.5).clamp(0.0, last);
    let t0 = f.floor() as u32;
    let t1 = (t0 + 1).min(tiles - 1);
    (t0, t1, f - f64::from(t0))
}

/// Clipped-histogram CDF of one tile, normalized to [0, 1].
fn tile_lut(img: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_count: u32) -> [f64; NBINS] {
    let mut hist = [0u32; NBINS];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[img.get_pixel(x, y).0[0] as usize] += 1;
        }
    }
    clip_histogram(&mut hist, clip_count);

    let total: u32 = hist.iter().sum();
    let mut lut = [0.0; NBINS];
    let mut cdf = 0u32;
    for (bin, &count) in hist.iter().enumerate() {
        cdf += count;
        lut[bin] = f64::from(cdf) / f64::from(total.max(1));
    }
    lut
}

/// Clip every bin to `clip_count` and spread the excess evenly over all bins.
fn clip_histogram(hist: &mut [u32; NBINS], clip_count: u32) {
    let mut excess = 0u32;
    for count in hist.iter_mut() {
        if *count > clip_count {
            excess += *count - clip_count;
            *count = clip_count;
        }
    }
    if excess == 0 {
        return;
    }

    let per_bin = excess / NBINS as u32;
    let residual = (excess % NBINS as u32) as usize;
    for count in hist.iter_mut() {
        *count += per_bin;
    }
    if residual > 0 {
        let step = NBINS / residual;
        for bin in (0..NBINS).step_by(step).take(residual) {
            hist[bin] += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intensity::std_dev;

    /// Horizontal ramp confined to a narrow intensity band.
    fn create_low_contrast_image(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            Luma([(100 + x * 20 / width.max(1)) as u8])
        })
    }

    fn create_checkerboard(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    #[test]
    fn test_laplacian_variance_uniform_is_zero() {
        let img = GrayImage::from_pixel(20, 20, Luma([128]));
        assert_eq!(laplacian_variance(&img), 0.0);
    }

    #[test]
    fn test_laplacian_variance_checkerboard_is_high() {
        let img = create_checkerboard(20, 20);
        let variance = laplacian_variance(&img);
        assert!(
            variance > 10.0,
            "Checkerboard should have high variance, got {variance}"
        );
        assert!(variance <= 16.0);
    }

    #[test]
    fn test_laplacian_variance_single_edge_is_small() {
        let img = GrayImage::from_fn(32, 32, |x, _| {
            if x < 16 {
                Luma([0])
            } else {
                Luma([255])
            }
        });
        let variance = laplacian_variance(&img);
        assert!(variance > 0.0);
        assert!(variance < 1.0, "A clean edge should stay quiet, got {variance}");
    }

    #[test]
    fn test_laplacian_variance_empty() {
        assert_eq!(laplacian_variance(&GrayImage::new(0, 0)), 0.0);
    }

    #[test]
    fn test_median_removes_isolated_spike() {
        let mut img = GrayImage::from_pixel(5, 5, Luma([10]));
        img.put_pixel(2, 2, Luma([250]));
        let result = median_denoise(&img);
        assert_eq!(result.get_pixel(2, 2).0[0], 10);
        assert_eq!(result.dimensions(), (5, 5));
    }

    #[test]
    fn test_median_removes_sparse_salt_noise() {
        let img = GrayImage::from_fn(21, 21, |x, y| {
            if (3 * x + 5 * y) % 7 == 0 {
                Luma([255])
            } else {
                Luma([100])
            }
        });
        assert!(laplacian_variance(&img) > 0.0);

        let result = median_denoise(&img);
        assert!(result.pixels().all(|p| p.0[0] == 100));
        assert_eq!(laplacian_variance(&result), 0.0);
    }

    #[test]
    fn test_gaussian_smooths() {
        let img = create_checkerboard(16, 16);
        let blurred = gaussian_denoise(&img, 1.0).unwrap();
        assert_eq!(blurred.dimensions(), (16, 16));
        assert!(laplacian_variance(&blurred) < laplacian_variance(&img));
    }

    #[test]
    fn test_gaussian_rejects_non_positive_sigma() {
        let img = GrayImage::new(4, 4);
        assert!(matches!(
            gaussian_denoise(&img, 0.0),
            Err(ThermalError::InvalidOption(_))
        ));
        assert!(gaussian_denoise(&img, -1.0).is_err());
    }

    #[test]
    fn test_brightness_scales_and_clips() {
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, Luma([10]));
        img.put_pixel(1, 0, Luma([100]));
        img.put_pixel(2, 0, Luma([200]));

        let result = adjust_brightness(&img, 2.0);
        assert_eq!(result.get_pixel(0, 0).0[0], 20);
        assert_eq!(result.get_pixel(1, 0).0[0], 200);
        assert_eq!(result.get_pixel(2, 0).0[0], 255);
    }

    #[test]
    fn test_brightness_truncates() {
        let img = GrayImage::from_pixel(1, 1, Luma([3]));
        // 3 * 1.5 = 4.5 truncates to 4
        assert_eq!(adjust_brightness(&img, 1.5).get_pixel(0, 0).0[0], 4);
    }

    #[test]
    fn test_brightness_identity() {
        let img = create_low_contrast_image(8, 8);
        assert_eq!(adjust_brightness(&img, 1.0), img);
    }

    #[test]
    fn test_equalize_preserves_dimensions() {
        let img = create_low_contrast_image(37, 23);
        assert_eq!(equalize_adaptive(&img, 0.02).dimensions(), (37, 23));
    }

    #[test]
    fn test_equalize_increases_contrast() {
        let img = create_low_contrast_image(64, 64);
        // An unreachable clip count turns each tile into plain equalization
        let result = equalize_adaptive(&img, 1.0);
        assert!(
            std_dev(&result) > std_dev(&img),
            "std {} should exceed {}",
            std_dev(&result),
            std_dev(&img)
        );
    }

    #[test]
    fn test_equalize_low_clip_stays_near_input() {
        let img = create_low_contrast_image(128, 128);
        let result = equalize_adaptive(&img, 0.02);
        for (before, after) in img.pixels().zip(result.pixels()) {
            let diff = (i16::from(before.0[0]) - i16::from(after.0[0])).abs();
            assert!(diff < 64, "{} -> {}", before.0[0], after.0[0]);
        }
    }

    #[test]
    fn test_equalize_flat_image_stays_flat() {
        let img = GrayImage::from_pixel(32, 32, Luma([50]));
        let result = equalize_adaptive(&img, 0.02);
        let first = result.get_pixel(0, 0).0[0];
        assert!(result.pixels().all(|p| p.0[0] == first));
    }

    #[test]
    fn test_equalize_tiny_and_empty_images() {
        let tiny = GrayImage::from_pixel(3, 2, Luma([7]));
        assert_eq!(equalize_adaptive(&tiny, 0.02).dimensions(), (3, 2));
        let empty = GrayImage::new(0, 0);
        assert_eq!(equalize_adaptive(&empty, 0.02).dimensions(), (0, 0));
    }

    #[test]
    fn test_clip_histogram_conserves_counts() {
        let mut hist = [0u32; NBINS];
        hist[10] = 1000;
        hist[20] = 5;
        clip_histogram(&mut hist, 50);
        assert_eq!(hist.iter().sum::<u32>(), 1005);
        assert!(hist[10] <= 50 + 1000 / NBINS as u32 + 1);
    }

    #[test]
    fn test_tile_coords_clamp_at_edges() {
        let (t0, t1, w) = tile_coords(0, 8, 4);
        assert_eq!((t0, t1), (0, 1));
        assert_eq!(w, 0.0);

        let (t0, t1, w) = tile_coords(31, 8, 4);
        assert_eq!((t0, t1), (3, 3));
        assert_eq!(w, 0.0);
    }
}
