//! Core library for medical form scanning.
//!
//! This crate provides:
//! - Structured field extraction from noisy OCR text (label normalization,
//!   per-field recognizers, numeric coercion)
//! - The OCR collaborator seam and a tesseract subprocess backend
//! - The prediction service schema and HTTP client
//! - Configuration and scan report models

pub mod error;
pub mod extraction;
pub mod models;
pub mod ocr;
pub mod predict;
pub mod scanner;

pub use error::{ExtractionError, FormscanError, OcrError, PredictError, Result};
pub use extraction::{
    extract_fields, Extraction, ExtractionResult, FieldDiagnostic, FieldExtractionEngine,
    FieldSpec, FieldValue, ValueShape, DIABETES_FIELDS,
};
pub use models::config::FormscanConfig;
pub use models::report::{ScanReport, SourceType};
pub use ocr::{detect_image_format, OcrBackend};
#[cfg(feature = "native")]
pub use ocr::TesseractEngine;
#[cfg(feature = "native")]
pub use predict::PredictionClient;
pub use predict::{PredictionInput, PredictionResponse};
pub use scanner::FormScanner;
