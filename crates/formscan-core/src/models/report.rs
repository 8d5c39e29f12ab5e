//! Scan report produced for each processed form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extraction::{ExtractionResult, FieldSpec};

/// Where the scanned text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Text recognized from an image by the OCR engine.
    Image,
    /// Text supplied directly (already recognized).
    Text,
}

/// Result of scanning one form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Source file name, when scanning from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// How the text was obtained.
    pub source_type: SourceType,

    /// Extracted fields.
    pub extracted: ExtractionResult,

    /// Fields dropped during numeric conversion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Text the fields were extracted from.
    pub raw_text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// When the scan finished.
    pub scanned_at: DateTime<Utc>,
}

impl ScanReport {
    /// Names of table fields that were not extracted.
    pub fn missing(&self, specs: &[FieldSpec]) -> Vec<&'static str> {
        self.extracted.missing(specs)
    }

    /// Whether every field of `specs` was extracted.
    pub fn is_complete(&self, specs: &[FieldSpec]) -> bool {
        self.missing(specs).is_empty()
    }

    /// Attach a source name.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
