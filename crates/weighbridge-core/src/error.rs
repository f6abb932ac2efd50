//! Error types for the weighbridge-core library.

use thiserror::Error;

/// Main error type for the weighbridge library.
#[derive(Error, Debug)]
pub enum WeighbridgeError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Report assembly or persistence error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Every page was processed but none yielded a ticket.
    #[error("No tickets found")]
    NoTickets,
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// A page carries no raster image to recognize.
    #[error("no image found on page {0}")]
    MissingPageImage(u32),

    /// The external rasterizer command failed.
    #[error("rasterizer failed: {0}")]
    Rasterizer(String),

    /// Failed to decode a page image.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The page image uses a pixel format the preprocessor refuses to reinterpret.
    #[error("unsupported image mode: {0}")]
    UnsupportedImage(String),

    /// Image preprocessing failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The OCR engine failed to produce text.
    #[error("text recognition failed: {0}")]
    Engine(String),
}

/// Reasons a page of OCR text did not yield a ticket.
///
/// These never leave the field extractor as errors; a page that fails
/// extraction simply contributes nothing to the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Required field is missing.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Field validation failed.
    #[error("validation failed for {field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

/// Errors related to report assembly and the report store.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Spreadsheet encoding failed.
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// CSV encoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A report filename that does not name a file inside the store.
    #[error("invalid report filename: {0}")]
    InvalidFilename(String),

    /// I/O error while persisting or reading a report.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the weighbridge library.
pub type Result<T> = std::result::Result<T, WeighbridgeError>;
