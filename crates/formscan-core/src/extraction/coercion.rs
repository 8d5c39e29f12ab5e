//! Conversion of matched literals into typed field values.

use super::fields::{FieldSpec, ValueShape};
use super::result::FieldValue;
use crate::error::ExtractionError;

/// Convert a literal already validated by the recognizer into the field's type.
///
/// Failure here means the literal was syntactically a number but does not fit
/// the target type (for example an integer that overflows `u32`).
pub fn coerce(spec: &FieldSpec, literal: &str) -> Result<FieldValue, ExtractionError> {
    let parse_error = |reason: String| ExtractionError::Parse {
        field: spec.name.to_string(),
        value: literal.to_string(),
        reason,
    };

    match spec.shape {
        ValueShape::Integer => literal
            .parse::<u32>()
            .map(FieldValue::Integer)
            .map_err(|e| parse_error(e.to_string())),
        ValueShape::Decimal => {
            let value = literal
                .parse::<f64>()
                .map_err(|e| parse_error(e.to_string()))?;
            if !value.is_finite() {
                return Err(parse_error("value out of range".to_string()));
            }
            Ok(FieldValue::Decimal(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::fields::{field_spec, AGE, GLUCOSE};

    #[test]
    fn test_coerce_integer() {
        let age = field_spec(AGE).unwrap();
        assert_eq!(coerce(age, "33").unwrap(), FieldValue::Integer(33));
        assert_eq!(coerce(age, "007").unwrap(), FieldValue::Integer(7));
    }

    #[test]
    fn test_coerce_decimal() {
        let glucose = field_spec(GLUCOSE).unwrap();
        assert_eq!(coerce(glucose, "148").unwrap(), FieldValue::Decimal(148.0));
        assert_eq!(coerce(glucose, "0.627").unwrap(), FieldValue::Decimal(0.627));
    }

    #[test]
    fn test_integer_overflow_is_a_parse_error() {
        let age = field_spec(AGE).unwrap();
        let err = coerce(age, "99999999999").unwrap_err();

        match err {
            ExtractionError::Parse { field, value, .. } => {
                assert_eq!(field, "Age");
                assert_eq!(value, "99999999999");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decimal_overflow_is_a_parse_error() {
        let glucose = field_spec(GLUCOSE).unwrap();
        let huge = "9".repeat(400);
        assert!(coerce(glucose, &huge).is_err());
    }
}
