//! Pixel-level transformations for thermal-style imagery.
//!
//! Provides 8-bit normalization with adaptive enhancement, a synthetic
//! thermal palette, pixel sampling and a linear pixel-to-temperature scale.
//! Every operation is a single pass over an in-memory raster; file-based
//! variants read the whole image, transform it and write the result.

pub mod analysis;
pub mod colormap;
pub mod enhance;
mod error;
pub mod filters;
pub mod intensity;
pub mod sample;
pub mod temperature;

// Re-exports for convenience
pub use analysis::{
    AnalysisPaths, AnalysisReport, TemperatureReading, analyze, read_temperature, reading_at,
    write_readings_csv,
};
pub use colormap::{apply_thermal_colormap, render_thermal, thermal_palette};
pub use enhance::{EnhanceOptions, Enhancement, enhance, enhance_image_auto, enhance_image_with};
pub use error::{Result, ThermalError};
pub use intensity::{IntensityImage, normalize_to_u8, to_intensity};
pub use sample::{get_pixel_value, pixel_value};
pub use temperature::{TemperatureRange, pixel_to_temperature};

/// Luma weights applied to (R, G, B) when reducing colour images to one channel.
pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];
