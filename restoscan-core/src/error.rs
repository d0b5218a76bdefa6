use restoscan_model::ModelError;
use restoscan_scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to scan website: {0}")]
    Scan(#[from] ScanError),

    #[error("Gemini analysis failed: {0}")]
    Model(#[from] ModelError),

    #[error("Failed to parse model response: {0}")]
    Parse(String),

    #[error("Model response does not match the expected schema: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
