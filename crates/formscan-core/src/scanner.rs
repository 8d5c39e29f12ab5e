//! Form scanning pipeline: OCR collaborator followed by field extraction.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::OcrError;
use crate::extraction::{Extraction, FieldExtractionEngine};
use crate::models::report::{ScanReport, SourceType};
use crate::ocr::{detect_image_format, OcrBackend};

/// Combines an OCR backend with the field extraction engine.
#[derive(Clone)]
pub struct FormScanner {
    ocr: Arc<dyn OcrBackend>,
    engine: &'static FieldExtractionEngine,
}

impl FormScanner {
    /// Create a scanner using the built-in field table.
    pub fn new(ocr: Arc<dyn OcrBackend>) -> Self {
        Self {
            ocr,
            engine: FieldExtractionEngine::diabetes(),
        }
    }

    /// Use a different extraction engine.
    pub fn with_engine(mut self, engine: &'static FieldExtractionEngine) -> Self {
        self.engine = engine;
        self
    }

    /// The OCR backend in use.
    pub fn ocr(&self) -> &dyn OcrBackend {
        self.ocr.as_ref()
    }

    /// The extraction engine in use.
    pub fn engine(&self) -> &'static FieldExtractionEngine {
        self.engine
    }

    /// Recognize an encoded image and extract its fields.
    ///
    /// Unrecognizable uploads and engine failures are errors; finding no
    /// fields is not.
    pub fn scan_image(&self, data: &[u8]) -> Result<ScanReport, OcrError> {
        let start = Instant::now();

        let format = detect_image_format(data)?;
        debug!("Scanning {:?} image of {} bytes", format, data.len());

        let text = self.ocr.recognize(data, format)?;
        let extraction = self.engine.extract_detailed(&text);

        info!(
            "Scanned image with {}: {} fields extracted",
            self.ocr.name(),
            extraction.result.len()
        );

        Ok(report(SourceType::Image, text, extraction, start))
    }

    /// Extract fields from text that has already been recognized.
    pub fn scan_text(&self, text: &str) -> ScanReport {
        let start = Instant::now();
        let extraction = self.engine.extract_detailed(text);
        report(SourceType::Text, text.to_string(), extraction, start)
    }
}

fn report(source_type: SourceType, raw_text: String, extraction: Extraction, start: Instant) -> ScanReport {
    ScanReport {
        source: None,
        source_type,
        extracted: extraction.result,
        warnings: extraction.diagnostics.iter().map(|d| d.to_string()).collect(),
        raw_text,
        processing_time_ms: start.elapsed().as_millis() as u64,
        scanned_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{FieldValue, DIABETES_FIELDS};
    use image::ImageFormat;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    struct FixedText(&'static str);

    impl OcrBackend for FixedText {
        fn name(&self) -> &str {
            "fixed"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn recognize(&self, _image: &[u8], format: ImageFormat) -> Result<String, OcrError> {
            assert_eq!(format, ImageFormat::Png);
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    impl OcrBackend for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn is_available(&self) -> bool {
            false
        }

        fn recognize(&self, _image: &[u8], _format: ImageFormat) -> Result<String, OcrError> {
            Err(OcrError::EngineUnavailable("not installed".to_string()))
        }
    }

    #[test]
    fn test_scan_image() {
        let scanner = FormScanner::new(Arc::new(FixedText("Glucose: 148\nAge 50")));
        let report = scanner.scan_image(PNG).unwrap();

        assert_eq!(report.source_type, SourceType::Image);
        assert_eq!(report.extracted.get("Glucose"), Some(FieldValue::Decimal(148.0)));
        assert_eq!(report.extracted.get("Age"), Some(FieldValue::Integer(50)));
        assert_eq!(report.missing(DIABETES_FIELDS).len(), 6);
        assert!(!report.is_complete(DIABETES_FIELDS));
    }

    #[test]
    fn test_scan_image_with_nothing_recognized() {
        let scanner = FormScanner::new(Arc::new(FixedText("")));
        let report = scanner.scan_image(PNG).unwrap();
        assert!(report.extracted.is_empty());
    }

    #[test]
    fn test_invalid_upload_never_reaches_engine() {
        let scanner = FormScanner::new(Arc::new(Broken));
        let err = scanner.scan_image(b"not an image").unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_engine_failure_is_an_error() {
        let scanner = FormScanner::new(Arc::new(Broken));
        assert!(matches!(
            scanner.scan_image(PNG),
            Err(OcrError::EngineUnavailable(_))
        ));
    }

    #[test]
    fn test_scan_text_reports_dropped_fields() {
        let scanner = FormScanner::new(Arc::new(Broken));
        let report = scanner.scan_text("Age: 12345678901 BMI 22.1");

        assert_eq!(report.source_type, SourceType::Text);
        assert_eq!(report.extracted.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("Age: dropped value"));
    }
}
