//! Core library for weighbridge ticket OCR processing.
//!
//! This crate provides:
//! - PDF page rasterization (poppler `pdftoppm` or embedded scan images)
//! - Fixed page preprocessing and OCR engine adapters
//! - Ticket field extraction (ticket number, date, weights, waste category)
//! - Batch aggregation, progress events and spreadsheet report assembly

pub mod batch;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod ticket;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchAggregator, TicketBatch};
pub use error::{WeighbridgeError, Result};
pub use models::config::WeighbridgeConfig;
pub use models::ticket::{TicketRecord, WasteCategory};
pub use ocr::{ImagePreprocessor, OcrEngine, TesseractEngine};
pub use pdf::{EmbeddedImageRasterizer, PageRasterizer, PdftoppmRasterizer};
pub use pipeline::{PipelineOutcome, TicketPipeline};
pub use progress::{ProgressEvent, ProgressSink};
pub use report::{ReportBuilder, ReportFormat, ReportStore};
pub use ticket::{TicketExtractor, TicketParser};
