//! WASM bindings for medical form field extraction.
//!
//! OCR happens elsewhere (e.g. tesseract.js in the browser); these bindings
//! turn the recognized text into screening values.

use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

use formscan_core::extraction::{FieldExtractionEngine, ValueShape, DIABETES_FIELDS};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Plain objects rather than JS `Map`s for the field mapping.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract screening values from recognized text.
///
/// Returns an object mapping field names to numbers; absent fields are omitted.
#[wasm_bindgen]
pub fn extract_fields(text: &str) -> Result<JsValue, JsValue> {
    to_js(&formscan_core::extract_fields(text))
}

/// Rewrite alias spellings of field labels to their canonical form.
#[wasm_bindgen]
pub fn normalize_text(text: &str) -> String {
    FieldExtractionEngine::diabetes().normalize(text).into_owned()
}

#[derive(Serialize)]
struct FieldInfo {
    name: &'static str,
    label: &'static str,
    aliases: Vec<&'static str>,
    shape: ValueShape,
}

fn field_infos() -> Vec<FieldInfo> {
    DIABETES_FIELDS
        .iter()
        .map(|spec| FieldInfo {
            name: spec.name,
            label: spec.label,
            aliases: spec.aliases.iter().map(|a| a.phrase()).collect(),
            shape: spec.shape,
        })
        .collect()
}

/// Describe the extractable fields, in table order.
#[wasm_bindgen]
pub fn field_specs() -> Result<JsValue, JsValue> {
    to_js(&field_infos())
}

#[derive(Serialize)]
struct DetailedExtraction<'a> {
    extracted: &'a formscan_core::ExtractionResult,
    missing: Vec<&'static str>,
    warnings: Vec<String>,
}

/// Field extractor class for browser use.
#[wasm_bindgen]
pub struct FormExtractor {
    engine: &'static FieldExtractionEngine,
}

#[wasm_bindgen]
impl FormExtractor {
    /// Create an extractor for the built-in field table.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            engine: FieldExtractionEngine::diabetes(),
        }
    }

    /// Extract fields from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.engine.extract(text))
    }

    /// Extract fields along with the missing field names and dropped values.
    #[wasm_bindgen]
    pub fn extract_with_diagnostics(&self, text: &str) -> Result<JsValue, JsValue> {
        let extraction = self.engine.extract_detailed(text);

        let output = DetailedExtraction {
            extracted: &extraction.result,
            missing: extraction.result.missing(self.engine.specs()),
            warnings: extraction.diagnostics.iter().map(|d| d.to_string()).collect(),
        };

        to_js(&output)
    }

    /// Number of fields the extractor knows about.
    #[wasm_bindgen(getter)]
    pub fn field_count(&self) -> usize {
        self.engine.specs().len()
    }
}

impl Default for FormExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(
            normalize_text("BP: 80, DPF 0.5"),
            "Blood Pressure: 80, Diabetes Pedigree Function 0.5"
        );
        assert_eq!(normalize_text("SkinThickness 20"), "Skin Thickness 20");
    }

    #[test]
    fn test_field_infos_follow_table() {
        let infos = field_infos();
        assert_eq!(infos.len(), 8);
        assert_eq!(infos[0].name, "Pregnancies");
        assert_eq!(infos[2].aliases, vec!["BloodPressure", "BP"]);
        assert_eq!(infos[7].shape, ValueShape::Integer);
    }

    #[test]
    fn test_field_count() {
        assert_eq!(FormExtractor::new().field_count(), 8);
    }
}
