//! Linear pixel-to-temperature scale.

use serde::{Deserialize, Serialize};

/// Convert an 8-bit intensity to a temperature on the `mintemp..maxtemp` scale.
///
/// Values outside 0..=255 extrapolate linearly. `maxtemp` may be below
/// `mintemp`, which inverts the scale.
pub fn pixel_to_temperature(pixel_value: impl Into<f64>, mintemp: f64, maxtemp: f64) -> f64 {
    mintemp + (pixel_value.into() / 255.0) * (maxtemp - mintemp)
}

/// Temperature bounds mapped to intensities 0 and 255.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

impl Default for TemperatureRange {
    fn default() -> Self {
        Self { min: 0.0, max: 600.0 }
    }
}

impl TemperatureRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn to_temperature(&self, pixel_value: impl Into<f64>) -> f64 {
        pixel_to_temperature(pixel_value, self.min, self.max)
    }
}
