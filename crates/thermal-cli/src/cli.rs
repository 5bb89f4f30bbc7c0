//! Command-line definition and subcommand dispatch.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use thermal_image::{AnalysisPaths, TemperatureRange, TemperatureReading};

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "thermal", version, about = "Thermal image enhancement and temperature readout")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Normalize a high-bit-depth capture to 8-bit and enhance it
    Enhance {
        /// Source image
        input: PathBuf,
        /// Destination for the 8-bit grayscale result
        output: PathBuf,
    },

    /// Render an image with the thermal palette
    Colormap {
        /// Source image (grayscale or RGB)
        input: PathBuf,
        /// Destination for the RGB result
        output: PathBuf,
    },

    /// Print the intensity at a pixel (coordinates are clamped into the image)
    Sample {
        image: PathBuf,
        #[arg(allow_negative_numbers = true)]
        x: i64,
        #[arg(allow_negative_numbers = true)]
        y: i64,
    },

    /// Convert a pixel intensity to a temperature
    Temperature {
        #[arg(allow_negative_numbers = true)]
        pixel: f64,
        /// Temperature mapped to intensity 0 (defaults to THERMAL_MIN_TEMP)
        #[arg(long, allow_negative_numbers = true)]
        min_temp: Option<f64>,
        /// Temperature mapped to intensity 255 (defaults to THERMAL_MAX_TEMP)
        #[arg(long, allow_negative_numbers = true)]
        max_temp: Option<f64>,
    },

    /// Enhance, render and summarize a capture, optionally sampling points
    Analyze {
        input: PathBuf,
        /// Directory for processed.png and thermal.png (defaults to THERMAL_OUTPUT_DIR)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long, allow_negative_numbers = true)]
        min_temp: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        max_temp: Option<f64>,
        /// Point to read as X,Y; may be repeated
        #[arg(long = "point", value_parser = parse_point, allow_hyphen_values = true)]
        points: Vec<(i64, i64)>,
        /// Write point readings to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

impl Command {
    pub fn run(self, config: &AppConfig) -> anyhow::Result<()> {
        match self {
            Command::Enhance { input, output } => {
                thermal_image::enhance_image_auto(&input, &output)
                    .with_context(|| format!("failed to enhance {}", input.display()))?;
                info!(output = %output.display(), "Enhanced image written");
            }
            Command::Colormap { input, output } => {
                thermal_image::apply_thermal_colormap(&input, &output)
                    .with_context(|| format!("failed to colormap {}", input.display()))?;
                info!(output = %output.display(), "Thermal image written");
            }
            Command::Sample { image, x, y } => {
                let value = thermal_image::get_pixel_value(&image, x, y)
                    .with_context(|| format!("failed to sample {}", image.display()))?;
                println!("{value}");
            }
            Command::Temperature {
                pixel,
                min_temp,
                max_temp,
            } => {
                let range = config.range(min_temp, max_temp);
                println!("{}", range.to_temperature(pixel));
            }
            Command::Analyze {
                input,
                output_dir,
                min_temp,
                max_temp,
                points,
                csv,
            } => {
                let dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;

                let range = config.range(min_temp, max_temp);
                let paths = AnalysisPaths::in_dir(&dir);
                let report = thermal_image::analyze(&input, &paths, range)
                    .with_context(|| format!("failed to analyze {}", input.display()))?;

                let readings = read_points(&paths.processed, &points, range)?;
                if let Some(csv) = csv {
                    thermal_image::write_readings_csv(&csv, &readings)
                        .with_context(|| format!("failed to write {}", csv.display()))?;
                    info!(path = %csv.display(), count = readings.len(), "Readings written");
                }

                let out = serde_json::json!({ "report": report, "readings": readings });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
        }
        Ok(())
    }
}

/// Take temperature readings from the processed image, decoding it once.
fn read_points(
    processed: &Path,
    points: &[(i64, i64)],
    range: TemperatureRange,
) -> anyhow::Result<Vec<TemperatureReading>> {
    if points.is_empty() {
        return Ok(Vec::new());
    }
    let img = image::open(processed)
        .with_context(|| format!("failed to open {}", processed.display()))?;
    points
        .iter()
        .map(|&(x, y)| thermal_image::reading_at(&img, x, y, range).map_err(anyhow::Error::from))
        .collect()
}

/// Parse an `X,Y` pair.
fn parse_point(s: &str) -> Result<(i64, i64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x = x.trim().parse().map_err(|_| format!("invalid x in '{s}'"))?;
    let y = y.trim().parse().map_err(|_| format!("invalid y in '{s}'"))?;
    Ok((x, y))
}
