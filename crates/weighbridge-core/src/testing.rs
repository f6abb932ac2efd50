//! In-memory collaborators for pipeline tests.

use image::{DynamicImage, GrayImage, Luma};

use crate::error::{OcrError, PdfError};
use crate::ocr::OcrEngine;
use crate::pdf::PageRasterizer;

/// Page `i` is a blank image `i + 1` pixels wide, so the fake OCR engine
/// can tell pages apart after preprocessing.
pub fn blank_pages(count: usize) -> Vec<DynamicImage> {
    (0..count)
        .map(|i| DynamicImage::ImageLuma8(GrayImage::from_pixel(i as u32 + 1, 4, Luma([255]))))
        .collect()
}

/// Rasterizer returning a fixed number of blank pages.
pub struct FakeRasterizer {
    pub pages: usize,
}

impl PageRasterizer for FakeRasterizer {
    fn rasterize(&self, _pdf: &[u8], _dpi: u32) -> Result<Vec<DynamicImage>, PdfError> {
        if self.pages == 0 {
            return Err(PdfError::NoPages);
        }
        Ok(blank_pages(self.pages))
    }
}

/// OCR engine returning scripted text per page; `None` simulates a failure.
pub struct ScriptedOcr {
    pub texts: Vec<Option<String>>,
}

impl ScriptedOcr {
    pub fn new<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self {
            texts: texts.into_iter().map(|t| Some(t.into())).collect(),
        }
    }
}

impl OcrEngine for ScriptedOcr {
    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError> {
        let index = image.width() as usize - 1;
        self.texts
            .get(index)
            .cloned()
            .flatten()
            .ok_or_else(|| OcrError::Engine(format!("page {} unreadable", index + 1)))
    }
}

/// Page text for a complete ticket.
pub fn ticket_text(serial: &str, date: &str, gross: u32, tare: u32, net: u32, material: &str) -> String {
    format!(
        "Ticket No: 2024-P{}\nDate: {}\nGROSS {} TARE {} NET {}\n{}",
        serial, date, gross, tare, net, material
    )
}
