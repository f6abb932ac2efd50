//! OCR stage: page preprocessing and text recognition engines.

#[cfg(feature = "onnx")]
mod onnx;
mod preprocessing;
mod tesseract;

#[cfg(feature = "onnx")]
pub use onnx::OnnxOcrEngine;
pub use preprocessing::ImagePreprocessor;
pub use tesseract::TesseractEngine;

use image::GrayImage;

use crate::error::OcrError;
use crate::models::config::{OcrConfig, OcrEngineKind};

/// Trait for OCR engine implementations.
///
/// Recognition is best effort: the returned text carries no accuracy
/// guarantee and may be empty.
pub trait OcrEngine: Send + Sync {
    /// Recognize the text of one preprocessed page.
    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError>;
}

/// Build the OCR engine selected by configuration.
pub fn create_engine(config: &OcrConfig) -> Result<Box<dyn OcrEngine>, OcrError> {
    match config.engine {
        OcrEngineKind::Tesseract => Ok(Box::new(
            TesseractEngine::new(&config.tesseract_command).with_language(&config.language),
        )),
        #[cfg(feature = "onnx")]
        OcrEngineKind::Onnx => Ok(Box::new(OnnxOcrEngine::from_dir(&config.model_dir)?)),
        #[cfg(not(feature = "onnx"))]
        OcrEngineKind::Onnx => Err(OcrError::ModelLoad(
            "ONNX engine requires building with the `onnx` feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_default_engine() {
        assert!(create_engine(&OcrConfig::default()).is_ok());
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn test_onnx_requires_feature() {
        let config = OcrConfig {
            engine: OcrEngineKind::Onnx,
            ..OcrConfig::default()
        };
        assert!(matches!(create_engine(&config), Err(OcrError::ModelLoad(_))));
    }
}
