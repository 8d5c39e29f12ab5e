//! Configuration structures for the scanning service.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FormscanError, Result};

/// Main configuration for formscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormscanConfig {
    /// HTTP server configuration.
    pub server: ServerConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Prediction service configuration.
    pub prediction: PredictionConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_address: String,

    /// Port to listen on.
    pub port: u16,

    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Path or name of the tesseract binary.
    pub binary: String,

    /// Tesseract language code(s), e.g. `eng` or `eng+deu`.
    pub language: String,

    /// Tesseract page segmentation mode (`--psm`).
    pub page_segmentation_mode: Option<u8>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
            page_segmentation_mode: None,
        }
    }
}

/// Remote prediction service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// URL the eight-field payload is POSTed to.
    pub endpoint: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://smart-disease-predictor-ml.onrender.com/predict".to_string(),
            timeout_secs: 30,
        }
    }
}

impl FormscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| FormscanError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| FormscanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override settings from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup("FORMSCAN_BIND") {
            self.server.bind_address = bind;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(endpoint) = lookup("FORMSCAN_PREDICTION_URL") {
            self.prediction.endpoint = endpoint;
        }
        if let Some(binary) = lookup("FORMSCAN_TESSERACT") {
            self.ocr.binary = binary;
        }
        if let Some(language) = lookup("FORMSCAN_OCR_LANG") {
            self.ocr.language = language;
        }
    }
}
