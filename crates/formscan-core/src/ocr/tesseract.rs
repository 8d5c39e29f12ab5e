//! Tesseract command-line OCR backend.

use std::io::{ErrorKind, Write};
use std::process::{Command, Output};
use std::time::Instant;

use image::ImageFormat;
use tracing::{debug, info, warn};

use super::{file_extension, OcrBackend};
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Runs the `tesseract` binary as a subprocess.
///
/// Each call writes the image to its own temporary file and reads the result
/// from the process's stdout, so concurrent calls never share files.
pub struct TesseractEngine {
    config: OcrConfig,
}

impl TesseractEngine {
    /// Create an engine from configuration.
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Arguments passed after the input path.
    fn arguments(&self) -> Vec<String> {
        let mut args = vec![
            "stdout".to_string(),
            "-l".to_string(),
            self.config.language.clone(),
        ];
        if let Some(psm) = self.config.page_segmentation_mode {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }
        args
    }

    fn run(&self, command: &mut Command) -> Result<Output, OcrError> {
        command.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => OcrError::EngineUnavailable(
                format!("{} could not be started: {}", self.config.binary, e),
            ),
            _ => OcrError::Io(e),
        })
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new(OcrConfig::default())
    }
}

impl OcrBackend for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        self.run(Command::new(&self.config.binary).arg("--version"))
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn recognize(&self, image: &[u8], format: ImageFormat) -> Result<String, OcrError> {
        let start = Instant::now();

        let mut input = tempfile::Builder::new()
            .prefix("formscan-")
            .suffix(&format!(".{}", file_extension(format)))
            .tempfile()?;
        input.write_all(image)?;
        input.flush()?;

        debug!(
            "Wrote {} byte upload to {}",
            image.len(),
            input.path().display()
        );

        let output = self.run(
            Command::new(&self.config.binary)
                .arg(input.path())
                .args(self.arguments()),
        )?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("{} exited with {}: {}", self.config.binary, output.status, stderr);
            return Err(OcrError::ExecutionFailed {
                code: output.status.code(),
                stderr,
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!(
            "Recognized {} characters in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(binary: &str) -> TesseractEngine {
        TesseractEngine::new(OcrConfig {
            binary: binary.to_string(),
            ..OcrConfig::default()
        })
    }

    #[test]
    fn test_arguments() {
        let engine = TesseractEngine::new(OcrConfig {
            language: "eng+deu".to_string(),
            page_segmentation_mode: Some(6),
            ..OcrConfig::default()
        });

        assert_eq!(
            engine.arguments(),
            vec!["stdout", "-l", "eng+deu", "--psm", "6"]
        );
        assert_eq!(TesseractEngine::default().arguments(), vec!["stdout", "-l", "eng"]);
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let engine = engine_with("formscan-no-such-ocr-binary");

        assert!(!engine.is_available());
        assert!(matches!(
            engine.recognize(b"\x89PNG\r\n\x1a\n", ImageFormat::Png),
            Err(OcrError::EngineUnavailable(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_execution_failure() {
        let engine = engine_with("false");

        match engine.recognize(b"\x89PNG\r\n\x1a\n", ImageFormat::Png) {
            Err(OcrError::ExecutionFailed { code, .. }) => assert_eq!(code, Some(1)),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_stdout_is_returned_trimmed() {
        // `echo <path> stdout -l eng` prints its arguments, standing in for tesseract.
        let engine = engine_with("echo");
        let text = engine
            .recognize(b"\x89PNG\r\n\x1a\n", ImageFormat::Png)
            .unwrap();

        assert!(text.ends_with(".png stdout -l eng"), "got {:?}", text);
        assert!(text.contains("formscan-"));
    }
}
