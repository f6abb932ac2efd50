//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GrayImage};
use tracing::{debug, info};

use super::OcrEngine;
use crate::error::OcrError;

/// OCR engine backed by `pure-onnx-ocr` (no external ONNX Runtime).
pub struct OnnxOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
}

impl OnnxOcrEngine {
    /// Create an engine from model files in a directory.
    pub fn from_dir(model_dir: &Path) -> Result<Self, OcrError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self { engine })
    }
}

impl OcrEngine for OnnxOcrEngine {
    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let page = DynamicImage::ImageLuma8(image.clone());

        let results = self
            .engine
            .run_from_image(&page)
            .map_err(|e| OcrError::Engine(format!("pure-onnx-ocr: {}", e)))?;

        // Reading order: rows of ~20px top to bottom, then left to right.
        let mut regions: Vec<(i64, f64, &str)> = results
            .iter()
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                ((y / 20.0) as i64, x, r.text.as_str())
            })
            .collect();
        regions.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        });

        let text = regions
            .iter()
            .map(|(_, _, text)| text.replace("[UNK]", " "))
            .collect::<Vec<_>>()
            .join("\n");

        debug!(
            "pure-onnx-ocr returned {} regions in {}ms",
            regions.len(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    polygon
        .exterior()
        .coords()
        .take(4)
        .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| (x.min(c.x), y.min(c.y)))
}
