//! Label normalization applied to OCR text before field matching.
//!
//! Every alias of every field is rewritten to that field's canonical label, so
//! the recognizers only ever have to match one spelling. Aliases are checked
//! at construction time so that no alias occurs inside another alias or inside
//! any canonical label; this keeps the substitutions independent of each other
//! and makes normalization idempotent.

use std::borrow::Cow;

use regex::{Captures, Regex};
use tracing::trace;

use super::fields::{Alias, FieldSpec};
use super::Result;
use crate::error::ExtractionError;

struct Substitution {
    pattern: Regex,
    alias: &'static str,
    label: &'static str,
}

/// Rewrites alias spellings to canonical labels.
pub struct TextNormalizer {
    substitutions: Vec<Substitution>,
}

impl TextNormalizer {
    /// Build a normalizer for the aliases declared in `specs`.
    pub fn new(specs: &[FieldSpec]) -> Result<Self> {
        check_independent(specs)?;

        let mut substitutions = Vec::new();
        for spec in specs {
            for alias in spec.aliases {
                let escaped = regex::escape(alias.phrase());
                let source = match alias {
                    Alias::Joined(_) => format!("(?i){}", escaped),
                    // Only a following letter disqualifies, so `BP72` still expands
                    Alias::Abbreviation(_) => format!(r"(?i)\b{}([^\p{{L}}]|$)", escaped),
                };
                let pattern = Regex::new(&source).map_err(|e| ExtractionError::Pattern {
                    field: spec.name.to_string(),
                    reason: e.to_string(),
                })?;
                substitutions.push(Substitution {
                    pattern,
                    alias: alias.phrase(),
                    label: spec.label,
                });
            }
        }

        Ok(Self { substitutions })
    }

    /// Rewrite all known aliases in `text` to their canonical labels.
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(text);

        for sub in &self.substitutions {
            let label = sub.label;
            let replace = |caps: &Captures<'_>| {
                let trailer = caps.get(1).map_or("", |m| m.as_str());
                format!("{}{}", label, trailer)
            };
            let rewritten = match sub.pattern.replace_all(&current, replace) {
                Cow::Owned(s) => Some(s),
                Cow::Borrowed(_) => None,
            };
            if let Some(s) = rewritten {
                trace!("Normalized alias {:?} to {:?}", sub.alias, sub.label);
                current = Cow::Owned(s);
            }
        }

        current
    }

    /// Number of alias rules.
    pub fn len(&self) -> usize {
        self.substitutions.len()
    }

    /// Whether the normalizer has no alias rules.
    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty()
    }
}

/// Reject alias tables whose substitutions could interact.
fn check_independent(specs: &[FieldSpec]) -> Result<()> {
    let aliases: Vec<(&FieldSpec, &Alias)> = specs
        .iter()
        .flat_map(|spec| spec.aliases.iter().map(move |alias| (spec, alias)))
        .collect();

    for (i, (spec, alias)) in aliases.iter().enumerate() {
        let other_aliases = aliases
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, (_, other))| other.phrase());
        let labels = specs.iter().map(|s| s.label);

        for haystack in other_aliases.chain(labels) {
            if occurs_in(alias, haystack) {
                return Err(ExtractionError::Pattern {
                    field: spec.name.to_string(),
                    reason: format!(
                        "alias {:?} overlaps with {:?}",
                        alias.phrase(),
                        haystack
                    ),
                });
            }
        }
    }

    Ok(())
}

fn occurs_in(alias: &Alias, haystack: &str) -> bool {
    match alias {
        Alias::Joined(phrase) => haystack
            .to_ascii_lowercase()
            .contains(&phrase.to_ascii_lowercase()),
        Alias::Abbreviation(phrase) => haystack
            .split(|c: char| !c.is_alphabetic())
            .any(|word| word.eq_ignore_ascii_case(phrase)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::fields::{ValueShape, DIABETES_FIELDS};

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(DIABETES_FIELDS).unwrap()
    }

    #[test]
    fn test_joined_aliases_are_split() {
        let n = normalizer();
        assert_eq!(
            n.normalize("BloodPressure=72 SkinThickness=35"),
            "Blood Pressure=72 Skin Thickness=35"
        );
        assert_eq!(
            n.normalize("diabetespedigreefunction: 0.627"),
            "Diabetes Pedigree Function: 0.627"
        );
    }

    #[test]
    fn test_abbreviations_expand_only_as_words() {
        let n = normalizer();
        assert_eq!(n.normalize("DPF 0.35"), "Diabetes Pedigree Function 0.35");
        assert_eq!(n.normalize("BP: 80"), "Blood Pressure: 80");
        assert_eq!(n.normalize("BPM 72"), "BPM 72");
        assert_eq!(n.normalize("xBP 72"), "xBP 72");
    }

    #[test]
    fn test_abbreviations_expand_before_digits() {
        let n = normalizer();
        assert_eq!(n.normalize("DPF0.627"), "Diabetes Pedigree Function0.627");
        assert_eq!(n.normalize("bp72 BP"), "Blood Pressure72 Blood Pressure");
        assert_eq!(n.normalize("BP BP: 1"), "Blood Pressure Blood Pressure: 1");
    }

    #[test]
    fn test_plain_text_is_borrowed() {
        let n = normalizer();
        let out = n.normalize("Glucose: 148, Age-33");
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let n = normalizer();
        let samples = [
            "",
            "BloodPressure=72 SkinThickness=35",
            "DPF: 0.5\nbp 70\nDiabetesPedigreeFunction 0.2",
            "Pregnancies 6 Glucose 148 Blood  Pressure 72",
        ];

        for sample in samples {
            let once = n.normalize(sample).into_owned();
            let twice = n.normalize(&once).into_owned();
            assert_eq!(once, twice, "normalizing {:?} twice changed it", sample);
        }
    }

    #[test]
    fn test_substitution_order_does_not_matter() {
        let n = normalizer();
        let reversed = TextNormalizer {
            substitutions: TextNormalizer::new(DIABETES_FIELDS)
                .unwrap()
                .substitutions
                .into_iter()
                .rev()
                .collect(),
        };
        let text = "BP 70 / BloodPressure 72, DPF 0.1 SkinThickness 20 DiabetesPedigreeFunction 0.3";

        assert_eq!(n.normalize(text), reversed.normalize(text));
    }

    #[test]
    fn test_numbers_are_untouched() {
        let n = normalizer();
        let text = "BloodPressure 72.5 DPF 0.627 BP 80";
        let digits = |s: &str| s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect::<String>();

        assert_eq!(digits(text), digits(&n.normalize(text)));
    }

    #[test]
    fn test_overlapping_aliases_are_rejected() {
        static CLASHING: &[FieldSpec] = &[
            FieldSpec {
                name: "Pressure",
                label: "Pressure",
                aliases: &[Alias::Joined("Press")],
                shape: ValueShape::Decimal,
                priority: 0,
            },
        ];

        assert!(matches!(
            TextNormalizer::new(CLASHING),
            Err(ExtractionError::Pattern { .. })
        ));
    }

    #[test]
    fn test_builtin_table_has_aliases() {
        assert_eq!(normalizer().len(), 5);
    }
}
