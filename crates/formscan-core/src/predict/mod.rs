//! Prediction service schema and client.
//!
//! The extraction result only pre-fills these fields; a prediction request is
//! always an explicit, complete eight-field payload.

#[cfg(feature = "native")]
mod client;

#[cfg(feature = "native")]
pub use client::PredictionClient;

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;
use crate::extraction::fields::*;
use crate::extraction::ExtractionResult;

/// Payload accepted by the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionInput {
    pub pregnancies: u32,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    pub bmi: f64,
    pub diabetes_pedigree_function: f64,
    pub age: u32,
}

/// Response returned by the prediction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Prediction label.
    pub prediction: String,
}

impl PredictionInput {
    /// Check the measurements for values the service cannot use.
    pub fn validate(&self) -> Vec<String> {
        let measurements = [
            ("glucose", self.glucose),
            ("bloodPressure", self.blood_pressure),
            ("skinThickness", self.skin_thickness),
            ("insulin", self.insulin),
            ("bmi", self.bmi),
            ("diabetesPedigreeFunction", self.diabetes_pedigree_function),
        ];

        measurements
            .iter()
            .filter_map(|(name, value)| {
                if !value.is_finite() {
                    Some(format!("{} must be a finite number", name))
                } else if *value < 0.0 {
                    Some(format!("{} must not be negative (got {})", name, value))
                } else {
                    None
                }
            })
            .collect()
    }
}

impl TryFrom<&ExtractionResult> for PredictionInput {
    type Error = ExtractionError;

    fn try_from(result: &ExtractionResult) -> Result<Self, Self::Error> {
        let missing = result.missing(DIABETES_FIELDS);
        if !missing.is_empty() {
            return Err(ExtractionError::MissingFields(
                missing.into_iter().map(String::from).collect(),
            ));
        }

        let decimal = |name: &str| result.get(name).map(|v| v.as_f64()).unwrap_or_default();
        let integer = |name: &str| {
            result
                .get(name)
                .and_then(|v| v.as_u32())
                .ok_or_else(|| ExtractionError::MissingFields(vec![name.to_string()]))
        };

        Ok(Self {
            pregnancies: integer(PREGNANCIES)?,
            glucose: decimal(GLUCOSE),
            blood_pressure: decimal(BLOOD_PRESSURE),
            skin_thickness: decimal(SKIN_THICKNESS),
            insulin: decimal(INSULIN),
            bmi: decimal(BMI),
            diabetes_pedigree_function: decimal(DIABETES_PEDIGREE_FUNCTION),
            age: integer(AGE)?,
        })
    }
}
