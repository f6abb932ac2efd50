//! PDF page rasterization.

mod extractor;
mod pdftoppm;

pub use extractor::EmbeddedImageRasterizer;
pub use pdftoppm::PdftoppmRasterizer;

use crate::error::PdfError;
use crate::models::config::{PdfConfig, RasterizerKind};
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for turning a PDF into one raster image per page.
pub trait PageRasterizer: Send + Sync {
    /// Rasterize every page, in document order, at the given resolution.
    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<Vec<DynamicImage>>;
}

/// Build the rasterizer selected by configuration.
pub fn create_rasterizer(config: &PdfConfig) -> Box<dyn PageRasterizer> {
    match config.rasterizer {
        RasterizerKind::Pdftoppm => Box::new(PdftoppmRasterizer::new(&config.pdftoppm_command)),
        RasterizerKind::Embedded => Box::new(EmbeddedImageRasterizer::new()),
    }
}
