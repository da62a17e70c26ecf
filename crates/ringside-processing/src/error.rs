/// Image processing errors
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Invalid transform options: {0}")]
    InvalidOptions(String),
}

/// Result type for processing operations
pub type ProcessingResult<T> = Result<T, ProcessingError>;
