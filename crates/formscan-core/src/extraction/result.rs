//! Extraction output types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::fields::FieldSpec;

/// A parsed field value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Count or age.
    Integer(u32),
    /// Measurement with an optional fractional part.
    Decimal(f64),
}

impl FieldValue {
    /// The value as a float, whatever its shape.
    pub fn as_f64(&self) -> f64 {
        match *self {
            FieldValue::Integer(v) => f64::from(v),
            FieldValue::Decimal(v) => v,
        }
    }

    /// The value as an integer, if it is one.
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            FieldValue::Integer(v) => Some(v),
            FieldValue::Decimal(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Decimal(v) => write!(f, "{}", v),
        }
    }
}

/// Mapping from field name to parsed value.
///
/// A key is present only when a syntactically valid number was found for it;
/// missing fields are omitted rather than stored as placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    fields: BTreeMap<String, FieldValue>,
}

impl ExtractionResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    /// Value of a field, if extracted.
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.fields.get(name).copied()
    }

    /// Whether a field was extracted.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over extracted fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Names of the fields in `specs` that were not extracted, in table order.
    pub fn missing(&self, specs: &[FieldSpec]) -> Vec<&'static str> {
        specs
            .iter()
            .filter(|spec| !self.contains(spec.name))
            .map(|spec| spec.name)
            .collect()
    }

    /// Consume the result, returning the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, FieldValue> {
        self.fields
    }
}

/// A field whose label matched but whose value was dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDiagnostic {
    /// Field name.
    pub field: String,
    /// The literal that failed to convert.
    pub literal: String,
    /// Why it was dropped.
    pub reason: String,
}

impl fmt::Display for FieldDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: dropped value {:?} ({})",
            self.field, self.literal, self.reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::fields::{AGE, BMI, DIABETES_FIELDS, GLUCOSE};

    #[test]
    fn test_serializes_as_flat_json_numbers() {
        let mut result = ExtractionResult::new();
        result.insert(GLUCOSE, FieldValue::Decimal(148.0));
        result.insert(AGE, FieldValue::Integer(33));
        result.insert(BMI, FieldValue::Decimal(33.6));

        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"Age":33,"BMI":33.6,"Glucose":148.0}"#);
    }

    #[test]
    fn test_missing_follows_table_order() {
        let mut result = ExtractionResult::new();
        result.insert(GLUCOSE, FieldValue::Decimal(100.0));
        result.insert(AGE, FieldValue::Integer(40));

        assert_eq!(
            result.missing(DIABETES_FIELDS),
            vec![
                "Pregnancies",
                "BloodPressure",
                "SkinThickness",
                "Insulin",
                "BMI",
                "DiabetesPedigreeFunction",
            ]
        );
    }

    #[test]
    fn test_field_value_conversions() {
        assert_eq!(FieldValue::Integer(6).as_f64(), 6.0);
        assert_eq!(FieldValue::Integer(6).as_u32(), Some(6));
        assert_eq!(FieldValue::Decimal(0.627).as_u32(), None);
        assert_eq!(FieldValue::Decimal(0.627).to_string(), "0.627");
    }
}
