//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Input text is empty
    #[error("No text provided")]
    EmptyInput,

    /// Input does not fit the encoder sequence length
    #[error("Input too long: {length} characters (maximum {max})")]
    InputTooLong {
        length: usize,
        max: usize,
    },

    /// Token index outside of a vocabulary
    #[error("Token index {index} out of range for vocabulary of size {size}")]
    TokenOutOfRange {
        index: usize,
        size: usize,
    },

    /// Decoder produced an index with no character mapping
    #[error("No character mapped to target index {index}")]
    UnknownTargetIndex {
        index: usize,
    },

    /// Model configuration (vocabularies, dimensions) is inconsistent
    #[error("Model configuration error: {message}")]
    ModelConfigError {
        message: String,
    },

    /// Tensor missing from the checkpoint
    #[error("Missing tensor: {name}")]
    MissingTensor {
        name: String,
    },

    /// Tensor present but with an unexpected shape
    #[error("Shape mismatch for {name}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Tensor stored with a dtype we cannot read
    #[error("Unsupported dtype for {name}: {dtype}")]
    UnsupportedDtype {
        name: String,
        dtype: String,
    },

    /// API request failed
    #[error("API error: {status} - {message}")]
    ApiError {
        status: u16,
        message: String,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        message: String,
    },

    /// File operation error
    #[error("File error: {path} - {message}")]
    FileError {
        path: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Checkpoint parse error
    #[error("Checkpoint error: {0}")]
    CheckpointError(#[from] safetensors::SafeTensorError),
}

impl TranslationError {
    /// Whether the error was caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TranslationError::EmptyInput | TranslationError::InputTooLong { .. }
        )
    }

    /// Whether a remote call failing with this error is worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::NetworkError { .. } | TranslationError::HttpError(_) => true,
            TranslationError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
