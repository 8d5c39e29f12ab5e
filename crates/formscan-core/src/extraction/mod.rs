//! Structured field extraction from OCR text.

mod coercion;
mod engine;
pub mod fields;
mod normalizer;
mod recognizer;
mod result;

pub use coercion::coerce;
pub use engine::{extract_fields, Extraction, FieldExtractionEngine};
pub use fields::{field_spec, Alias, FieldSpec, ValueShape, DIABETES_FIELDS};
pub use normalizer::TextNormalizer;
pub use recognizer::FieldRecognizer;
pub use result::{ExtractionResult, FieldDiagnostic, FieldValue};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// A label/value occurrence found in text.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    /// Field name.
    pub field: &'static str,
    /// The numeric literal as written.
    pub literal: String,
    /// Byte range of the whole match.
    pub position: (usize, usize),
    /// Byte range of the label part.
    pub label_span: (usize, usize),
    /// Source text that was matched.
    pub source: String,
}

impl FieldMatch {
    /// Whether this match's label overlaps the byte range `span`.
    pub fn label_overlaps(&self, span: (usize, usize)) -> bool {
        self.label_span.0 < span.1 && span.0 < self.label_span.1
    }
}
