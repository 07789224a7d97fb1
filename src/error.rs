use thiserror::Error;

/// Failure of the external text recognition step.
///
/// Callers treat any of these as "no text": the piece keeps whatever
/// stats it had before the submission.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to load image: {0}")]
    Image(#[from] image::ImageError),

    #[error("OCR request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OCR server error: {0}")]
    Server(String),

    #[error("OCR task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to determine config directory")]
    NoConfigDir,
}

/// A build option name that matches none of the known variants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: '{value}'")]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseVariantError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
