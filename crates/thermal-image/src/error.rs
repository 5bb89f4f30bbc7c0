/// Errors that can occur while reading, transforming or writing images.
#[derive(Debug, thiserror::Error)]
pub enum ThermalError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Image has no pixels")]
    EmptyImage,

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

/// Result type alias for thermal image operations.
pub type Result<T> = std::result::Result<T, ThermalError>;
