//! Extraction orchestrator: normalize once, then run every field recognizer.

use std::borrow::Cow;
use std::collections::HashSet;

use lazy_static::lazy_static;
use serde::Serialize;
use tracing::{debug, trace, warn};

use super::coercion::coerce;
use super::fields::{FieldSpec, DIABETES_FIELDS};
use super::normalizer::TextNormalizer;
use super::recognizer::FieldRecognizer;
use super::result::{ExtractionResult, FieldDiagnostic};
use super::Result;
use crate::error::ExtractionError;

lazy_static! {
    static ref DIABETES_ENGINE: FieldExtractionEngine =
        FieldExtractionEngine::new(DIABETES_FIELDS).expect("built-in field table is valid");
}

/// Extract the built-in fields from raw OCR text.
pub fn extract_fields(text: &str) -> ExtractionResult {
    DIABETES_ENGINE.extract(text)
}

/// Extraction output together with fields dropped along the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
    /// Successfully extracted fields.
    pub result: ExtractionResult,
    /// Fields whose label matched but whose value could not be converted.
    pub diagnostics: Vec<FieldDiagnostic>,
}

/// Recovers a fixed set of numeric fields from noisy text.
pub struct FieldExtractionEngine {
    specs: Vec<FieldSpec>,
    normalizer: TextNormalizer,
    /// Sorted by priority.
    recognizers: Vec<FieldRecognizer>,
}

impl FieldExtractionEngine {
    /// Build an engine for `specs`.
    pub fn new(specs: &[FieldSpec]) -> Result<Self> {
        let mut seen = HashSet::new();
        for spec in specs {
            if !seen.insert(spec.name) {
                return Err(ExtractionError::Pattern {
                    field: spec.name.to_string(),
                    reason: "duplicate field name".to_string(),
                });
            }
        }

        let normalizer = TextNormalizer::new(specs)?;
        let mut recognizers = specs
            .iter()
            .map(FieldRecognizer::new)
            .collect::<Result<Vec<_>>>()?;
        recognizers.sort_by_key(|r| r.spec().priority);

        debug!(
            "Built extraction engine with {} fields and {} aliases",
            specs.len(),
            normalizer.len()
        );

        Ok(Self {
            specs: specs.to_vec(),
            normalizer,
            recognizers,
        })
    }

    /// The process-wide engine over the built-in field table.
    pub fn diabetes() -> &'static FieldExtractionEngine {
        &DIABETES_ENGINE
    }

    /// Field table, in the order it was given.
    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    /// Apply alias normalization only.
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.normalizer.normalize(text)
    }

    /// Extract fields, discarding diagnostics.
    pub fn extract(&self, text: &str) -> ExtractionResult {
        self.extract_detailed(text).result
    }

    /// Extract fields and report those dropped during numeric conversion.
    pub fn extract_detailed(&self, text: &str) -> Extraction {
        let mut extraction = Extraction::default();

        if text.trim().is_empty() {
            debug!("Empty text, nothing to extract");
            return extraction;
        }

        let normalized = self.normalizer.normalize(text);
        let mut claimed: Vec<(usize, usize)> = Vec::with_capacity(self.recognizers.len());

        for recognizer in &self.recognizers {
            let spec = recognizer.spec();
            let found = recognizer
                .matches(&normalized)
                .find(|m| !claimed.iter().any(|span| m.label_overlaps(*span)));

            let Some(found) = found else {
                trace!("No match for {}", spec.name);
                continue;
            };
            claimed.push(found.label_span);

            match coerce(spec, &found.literal) {
                Ok(value) => {
                    debug!("Extracted {} = {} from {:?}", spec.name, value, found.source);
                    extraction.result.insert(spec.name, value);
                }
                Err(e) => {
                    warn!("Dropping {}: {}", spec.name, e);
                    extraction.diagnostics.push(FieldDiagnostic {
                        field: spec.name.to_string(),
                        literal: found.literal,
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(
            "Extracted {} of {} fields",
            extraction.result.len(),
            self.recognizers.len()
        );

        extraction
    }
}
