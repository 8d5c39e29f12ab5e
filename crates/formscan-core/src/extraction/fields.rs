//! Field table for diabetes screening forms.

use serde::{Deserialize, Serialize};

/// Numeric shape accepted for a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    /// One or more decimal digits (counts, ages).
    Integer,
    /// Digits with an optional fractional part.
    Decimal,
}

/// An alternate spelling of a field label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alias {
    /// Run-together variant, replaced wherever it occurs (e.g. `BloodPressure`).
    Joined(&'static str),
    /// Abbreviation, replaced only when it stands as a whole word (e.g. `DPF`).
    Abbreviation(&'static str),
}

impl Alias {
    /// The alias phrase as written.
    pub fn phrase(&self) -> &'static str {
        match self {
            Alias::Joined(s) | Alias::Abbreviation(s) => s,
        }
    }
}

/// Static description of one extractable field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Key used in the extraction result.
    pub name: &'static str,
    /// Canonical label phrase as printed on the form.
    pub label: &'static str,
    /// Alternate spellings rewritten to `label` before matching.
    pub aliases: &'static [Alias],
    /// Accepted value shape.
    pub shape: ValueShape,
    /// Tie-break when label spans of two fields overlap (lower wins).
    pub priority: u8,
}

impl FieldSpec {
    /// Words of the canonical label.
    pub fn label_words(&self) -> impl Iterator<Item = &'static str> {
        self.label.split_whitespace()
    }
}

/// Field names, in table order.
pub const PREGNANCIES: &str = "Pregnancies";
pub const GLUCOSE: &str = "Glucose";
pub const BLOOD_PRESSURE: &str = "BloodPressure";
pub const SKIN_THICKNESS: &str = "SkinThickness";
pub const INSULIN: &str = "Insulin";
pub const BMI: &str = "BMI";
pub const DIABETES_PEDIGREE_FUNCTION: &str = "DiabetesPedigreeFunction";
pub const AGE: &str = "Age";

/// The built-in field table, ordered by priority.
pub static DIABETES_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: PREGNANCIES,
        label: "Pregnancies",
        aliases: &[],
        shape: ValueShape::Integer,
        priority: 0,
    },
    FieldSpec {
        name: GLUCOSE,
        label: "Glucose",
        aliases: &[],
        shape: ValueShape::Decimal,
        priority: 1,
    },
    FieldSpec {
        name: BLOOD_PRESSURE,
        label: "Blood Pressure",
        aliases: &[Alias::Joined("BloodPressure"), Alias::Abbreviation("BP")],
        shape: ValueShape::Decimal,
        priority: 2,
    },
    FieldSpec {
        name: SKIN_THICKNESS,
        label: "Skin Thickness",
        aliases: &[Alias::Joined("SkinThickness")],
        shape: ValueShape::Decimal,
        priority: 3,
    },
    FieldSpec {
        name: INSULIN,
        label: "Insulin",
        aliases: &[],
        shape: ValueShape::Decimal,
        priority: 4,
    },
    FieldSpec {
        name: BMI,
        label: "BMI",
        aliases: &[],
        shape: ValueShape::Decimal,
        priority: 5,
    },
    FieldSpec {
        name: DIABETES_PEDIGREE_FUNCTION,
        label: "Diabetes Pedigree Function",
        aliases: &[
            Alias::Joined("DiabetesPedigreeFunction"),
            Alias::Abbreviation("DPF"),
        ],
        shape: ValueShape::Decimal,
        priority: 6,
    },
    FieldSpec {
        name: AGE,
        label: "Age",
        aliases: &[],
        shape: ValueShape::Integer,
        priority: 7,
    },
];

/// Look up a built-in field by its result key.
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    DIABETES_FIELDS.iter().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_and_priorities_are_unique() {
        let names: HashSet<_> = DIABETES_FIELDS.iter().map(|f| f.name).collect();
        let priorities: HashSet<_> = DIABETES_FIELDS.iter().map(|f| f.priority).collect();

        assert_eq!(names.len(), DIABETES_FIELDS.len());
        assert_eq!(priorities.len(), DIABETES_FIELDS.len());
    }

    #[test]
    fn test_aliases_are_alphabetic() {
        for spec in DIABETES_FIELDS {
            for alias in spec.aliases {
                assert!(
                    alias.phrase().chars().all(|c| c.is_ascii_alphabetic()),
                    "alias {:?} of {} must not touch numeric content",
                    alias,
                    spec.name
                );
            }
        }
    }

    #[test]
    fn test_field_spec_lookup() {
        assert_eq!(field_spec(AGE).map(|f| f.shape), Some(ValueShape::Integer));
        assert_eq!(field_spec(BMI).map(|f| f.shape), Some(ValueShape::Decimal));
        assert!(field_spec("Cholesterol").is_none());
    }
}
