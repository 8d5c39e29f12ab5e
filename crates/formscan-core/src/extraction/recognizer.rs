//! Per-field label/value recognizer.

use regex::{Captures, Regex};
use tracing::debug;

use super::fields::{FieldSpec, ValueShape};
use super::{FieldMatch, Result};
use crate::error::ExtractionError;

const SEPARATOR: &str = r"\s*[:=\-]?\s*";
const INTEGER_LITERAL: &str = r"([0-9]+)";
const DECIMAL_LITERAL: &str = r"([0-9]+(?:\.[0-9]+)?)";

/// Finds `<label> [sep] <number>` occurrences for one field.
pub struct FieldRecognizer {
    spec: FieldSpec,
    pattern: Regex,
}

impl FieldRecognizer {
    /// Compile the recognizer for `spec`.
    pub fn new(spec: &FieldSpec) -> Result<Self> {
        let source = pattern_source(spec);
        let pattern = Regex::new(&source).map_err(|e| ExtractionError::Pattern {
            field: spec.name.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            spec: *spec,
            pattern,
        })
    }

    /// The field this recognizer matches.
    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// Valid matches in `text`, left to right.
    pub fn matches<'t>(&'t self, text: &'t str) -> impl Iterator<Item = FieldMatch> + 't {
        self.pattern
            .captures_iter(text)
            .filter_map(move |caps| self.to_match(text, &caps))
    }

    fn to_match(&self, text: &str, caps: &Captures<'_>) -> Option<FieldMatch> {
        let whole = caps.get(0)?;
        let label = caps.get(1)?;
        let literal = caps.get(2)?;

        if has_dangling_point(text, literal.as_str(), literal.end()) {
            debug!(
                "Skipping {} at {}: {:?} ends in a bare decimal point",
                self.spec.name,
                whole.start(),
                whole.as_str()
            );
            return None;
        }

        Some(FieldMatch {
            field: self.spec.name,
            literal: literal.as_str().to_string(),
            position: (whole.start(), whole.end()),
            label_span: (label.start(), label.end()),
            source: whole.as_str().to_string(),
        })
    }
}

fn pattern_source(spec: &FieldSpec) -> String {
    let label = spec
        .label_words()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let literal = match spec.shape {
        ValueShape::Integer => INTEGER_LITERAL,
        ValueShape::Decimal => DECIMAL_LITERAL,
    };

    format!("(?i)({}){}{}", label, SEPARATOR, literal)
}

/// A whole-number literal followed by `.` with no digit after it is malformed.
fn has_dangling_point(text: &str, literal: &str, end: usize) -> bool {
    if literal.contains('.') {
        return false;
    }

    let mut rest = text[end..].chars();
    rest.next() == Some('.') && !rest.next().is_some_and(|c| c.is_ascii_digit())
}
