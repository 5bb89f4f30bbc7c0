//! End-to-end analysis of a capture: enhancement, thermal rendering,
//! average temperature and point readings exported as CSV.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use serde::Serialize;
use tracing::{debug, info};

use crate::Result;
use crate::colormap::render_thermal;
use crate::enhance::{EnhanceOptions, enhance};
use crate::intensity::{is_high_bit_depth, sample_mean, to_intensity};
use crate::sample::pixel_value;
use crate::temperature::TemperatureRange;

/// Timestamp format used in temperature readings.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column names of the readings CSV, in field order of [`TemperatureReading`].
const CSV_HEADER: [&str; 5] = ["timestamp", "x", "y", "pixel_value", "temperature"];

/// Output locations written by [`analyze`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPaths {
    /// 8-bit image that temperatures are sampled from.
    pub processed: PathBuf,
    /// Thermal-palette rendering of the processed image.
    pub colormap: PathBuf,
}

impl AnalysisPaths {
    /// `processed.png` and `thermal.png` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            processed: dir.join("processed.png"),
            colormap: dir.join("thermal.png"),
        }
    }
}

/// Summary of one [`analyze`] run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub processed: PathBuf,
    pub colormap: PathBuf,
    /// Whether the source was high-bit-depth and went through auto-enhancement.
    pub high_bit_depth: bool,
    pub min_temp: f64,
    pub max_temp: f64,
    /// Mean over every channel sample of the processed image.
    pub mean_intensity: f64,
    pub avg_temp: f64,
}

/// A temperature sampled at one point of a processed image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureReading {
    pub timestamp: String,
    pub x: i64,
    pub y: i64,
    pub pixel_value: u32,
    pub temperature: f64,
}

/// Process a capture the way the viewer expects it.
///
/// High-bit-depth sources are auto-enhanced to 8-bit; 8-bit sources are
/// re-encoded unchanged. The processed image is written, rendered with the
/// thermal palette, and the mean of all its channel samples converted to an
/// average temperature on `range`.
pub fn analyze(
    input: impl AsRef<Path>,
    paths: &AnalysisPaths,
    range: TemperatureRange,
) -> Result<AnalysisReport> {
    let input = input.as_ref();
    let src = image::open(input)?;
    let high_bit_depth = is_high_bit_depth(&src);
    debug!(input = %input.display(), high_bit_depth, "Analyzing capture");

    let processed = if high_bit_depth {
        let result = enhance(&to_intensity(&src), &EnhanceOptions::default())?;
        DynamicImage::ImageLuma8(result.image)
    } else {
        src
    };
    processed.save(&paths.processed)?;
    render_thermal(&processed).save(&paths.colormap)?;

    let mean_intensity = sample_mean(&processed);
    let avg_temp = range.to_temperature(mean_intensity);
    info!(
        processed = %paths.processed.display(),
        colormap = %paths.colormap.display(),
        mean_intensity,
        avg_temp,
        "Analysis complete"
    );

    Ok(AnalysisReport {
        processed: paths.processed.clone(),
        colormap: paths.colormap.clone(),
        high_bit_depth,
        min_temp: range.min,
        max_temp: range.max,
        mean_intensity,
        avg_temp,
    })
}

/// Sample `(x, y)` of a decoded image and convert it to a temperature reading.
pub fn reading_at(
    img: &DynamicImage,
    x: i64,
    y: i64,
    range: TemperatureRange,
) -> Result<TemperatureReading> {
    let pixel_value = pixel_value(img, x, y)?;
    Ok(TemperatureReading {
        timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        x,
        y,
        pixel_value,
        temperature: range.to_temperature(pixel_value),
    })
}

/// Read the image at `path` and take a temperature reading at `(x, y)`.
pub fn read_temperature(
    path: impl AsRef<Path>,
    x: i64,
    y: i64,
    range: TemperatureRange,
) -> Result<TemperatureReading> {
    let img = image::open(path.as_ref())?;
    reading_at(&img, x, y, range)
}

/// Write readings to `path` as CSV with a header row.
pub fn write_readings_csv(path: impl AsRef<Path>, readings: &[TemperatureReading]) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    if readings.is_empty() {
        wtr.write_record(CSV_HEADER)?;
    }
    for reading in readings {
        wtr.serialize(reading)?;
    }
    wtr.flush()?;
    debug!(path = %path.display(), count = readings.len(), "Wrote temperature readings");
    Ok(())
}
