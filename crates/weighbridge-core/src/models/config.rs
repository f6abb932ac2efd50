//! Configuration structures for the ticket pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the weighbridge pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeighbridgeConfig {
    /// PDF rasterization configuration.
    pub pdf: PdfConfig,

    /// OCR engine configuration.
    pub ocr: OcrConfig,

    /// Report output configuration.
    pub report: ReportConfig,

    /// HTTP server configuration.
    pub server: ServerConfig,
}

/// Which collaborator turns PDF pages into images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterizerKind {
    /// Render each page with poppler's `pdftoppm`.
    #[default]
    Pdftoppm,
    /// Use the scan image embedded in each page.
    Embedded,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Page rasterizer to use.
    pub rasterizer: RasterizerKind,

    /// Command used to invoke `pdftoppm`.
    pub pdftoppm_command: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_dpi: 300,
            rasterizer: RasterizerKind::default(),
            pdftoppm_command: "pdftoppm".to_string(),
        }
    }
}

/// Which OCR engine recognizes page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrEngineKind {
    /// The `tesseract` command line tool.
    #[default]
    Tesseract,
    /// Pure Rust ONNX models (requires the `onnx` feature).
    Onnx,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Engine to use.
    pub engine: OcrEngineKind,

    /// Command used to invoke `tesseract`.
    pub tesseract_command: String,

    /// Tesseract language code.
    pub language: String,

    /// Directory containing ONNX model files.
    pub model_dir: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::default(),
            tesseract_command: "tesseract".to_string(),
            language: "eng".to_string(),
            model_dir: PathBuf::from("models"),
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory reports are written to and downloaded from.
    pub output_dir: PathBuf,

    /// Report file format.
    pub format: crate::report::ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir().join("suez_uploads"),
            format: crate::report::ReportFormat::default(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,

    /// Largest accepted upload body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

impl WeighbridgeConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
