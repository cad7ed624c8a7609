use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to read matched path: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Failed to replace file atomically: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("End date {end} must be the same as or later than start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Required column(s) missing from merged header: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("No CSV files found matching '{pattern}' in {}", dir.display())]
    NoInputFiles { dir: PathBuf, pattern: String },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Operation cancelled by user")]
    Cancelled,
}
