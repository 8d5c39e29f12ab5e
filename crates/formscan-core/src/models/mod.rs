//! Data models.

pub mod config;
pub mod report;

pub use config::{FormscanConfig, OcrConfig, PredictionConfig, ServerConfig};
pub use report::{ScanReport, SourceType};
