//! Setting value validation.

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "THERMAL_MIN_TEMP" | "THERMAL_MAX_TEMP" => {
            let v: f64 = value.parse().map_err(|_| "must be a number")?;
            if !v.is_finite() {
                return Err("must be a finite number".into());
            }
        }
        "THERMAL_OUTPUT_DIR" => {
            if value.trim().is_empty() {
                return Err("must not be empty".into());
            }
        }
        _ => {}
    }
    Ok(())
}
