//! OCR collaborator: turns an uploaded image into raw text.
//!
//! The recognition itself is delegated to an external engine; this module only
//! validates the upload and defines the seam the rest of the crate talks to.

#[cfg(feature = "native")]
mod tesseract;

#[cfg(feature = "native")]
pub use tesseract::TesseractEngine;

pub use image::ImageFormat;

use crate::error::OcrError;

/// Something that can recognize text in an encoded image.
pub trait OcrBackend: Send + Sync {
    /// Short engine name for logs and health reports.
    fn name(&self) -> &str;

    /// Whether the engine can currently be used.
    fn is_available(&self) -> bool;

    /// Recognize text in `image`, encoded as `format`.
    fn recognize(&self, image: &[u8], format: ImageFormat) -> Result<String, OcrError>;
}

/// Identify the encoding of an uploaded image from its magic bytes.
pub fn detect_image_format(data: &[u8]) -> Result<ImageFormat, OcrError> {
    if data.is_empty() {
        return Err(OcrError::InvalidImage("upload is empty".to_string()));
    }

    image::guess_format(data).map_err(|e| OcrError::InvalidImage(e.to_string()))
}

/// File extension tesseract expects for `format`.
pub fn file_extension(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("img")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF\0";

    #[test]
    fn test_detect_image_format() {
        assert_eq!(detect_image_format(PNG_MAGIC).unwrap(), ImageFormat::Png);
        assert_eq!(detect_image_format(JPEG_MAGIC).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_rejects_non_images() {
        assert!(matches!(
            detect_image_format(b""),
            Err(OcrError::InvalidImage(_))
        ));
        assert!(matches!(
            detect_image_format(b"Glucose: 148"),
            Err(OcrError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension(ImageFormat::Png), "png");
        assert_eq!(file_extension(ImageFormat::Jpeg), "jpg");
    }
}
