//! OCR engine wrapping the `tesseract` command line tool.

use std::process::Command;
use std::time::Instant;

use image::GrayImage;
use tracing::{debug, trace};

use super::OcrEngine;
use crate::error::OcrError;

/// Runs `tesseract <page.png> stdout` for each page.
pub struct TesseractEngine {
    command: String,
    language: Option<String>,
}

impl TesseractEngine {
    /// Create an engine invoking the given command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: None,
        }
    }

    /// Set the recognition language (`-l`).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        self.language = (!language.is_empty()).then_some(language);
        self
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError> {
        let start = Instant::now();

        let tmpdir = tempfile::TempDir::with_prefix("tesseract")
            .map_err(|e| OcrError::Engine(format!("cannot create temp dir: {}", e)))?;
        let input_path = tmpdir.path().join("page.png");
        image
            .save_with_format(&input_path, image::ImageFormat::Png)
            .map_err(|e| OcrError::Engine(format!("cannot write tesseract input: {}", e)))?;

        let mut command = Command::new(&self.command);
        command.arg(&input_path).arg("stdout");
        if let Some(language) = &self.language {
            command.arg("-l").arg(language);
        }
        trace!("Running {:?}", command);

        let output = command
            .output()
            .map_err(|e| OcrError::Engine(format!("cannot run {}: {}", self.command, e)))?;

        if !output.status.success() {
            return Err(OcrError::Engine(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            "tesseract recognized {} chars in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}
