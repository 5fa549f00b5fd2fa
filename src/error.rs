use thiserror::Error;

pub type Result<T> = std::result::Result<T, DetectionError>;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration source error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid thresholds for {variable}: {message}")]
    InvalidThresholds { variable: String, message: String },

    #[error("No thresholds configured for variable {0}")]
    UnknownVariable(String),

    #[error("No episode definition named '{0}'")]
    UnknownEpisode(String),

    #[error("Invalid percentile {0}: must be within 0..=100")]
    InvalidPercentile(f64),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
