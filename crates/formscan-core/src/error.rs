//! Error types for the formscan-core library.

use thiserror::Error;

/// Main error type for the formscan library.
#[derive(Error, Debug)]
pub enum FormscanError {
    /// OCR collaborator error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Prediction service error.
    #[error("prediction error: {0}")]
    Prediction(#[from] PredictError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning an uploaded image into text.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The upload is empty or not an image format we recognize.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// The OCR binary could not be started.
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The OCR binary ran but exited unsuccessfully.
    #[error("OCR engine failed (exit code {code:?}): {stderr}")]
    ExecutionFailed { code: Option<i32>, stderr: String },

    /// Scratch file handling failed.
    #[error("OCR I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OcrError {
    /// Whether the error was caused by the caller's input rather than the engine.
    pub fn is_input_error(&self) -> bool {
        matches!(self, OcrError::InvalidImage(_))
    }
}

/// Errors related to structured field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A field label could not be compiled into a pattern.
    #[error("invalid pattern for {field}: {reason}")]
    Pattern { field: String, reason: String },

    /// A matched literal could not be converted to the field's type.
    #[error("failed to parse {field}: {value} ({reason})")]
    Parse {
        field: String,
        value: String,
        reason: String,
    },

    /// Fields required by a consumer were not extracted.
    #[error("missing fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

/// Errors talking to the remote prediction service.
#[derive(Error, Debug)]
pub enum PredictError {
    /// The request could not be sent or timed out.
    #[error("failed to connect to prediction service: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("prediction service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered with a body we could not decode.
    #[error("invalid prediction response: {0}")]
    Decode(String),

    /// The input failed validation before being sent.
    #[error("invalid prediction input: {}", .0.join("; "))]
    InvalidInput(Vec<String>),
}

/// Result type for the formscan library.
pub type Result<T> = std::result::Result<T, FormscanError>;
