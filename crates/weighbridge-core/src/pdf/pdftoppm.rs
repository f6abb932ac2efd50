//! Page rendering through poppler's `pdftoppm`.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tracing::{debug, trace};

use super::{PageRasterizer, Result};
use crate::error::PdfError;

/// Renders pages with `pdftoppm -r <dpi> -png`.
pub struct PdftoppmRasterizer {
    command: String,
}

impl PdftoppmRasterizer {
    /// Create a rasterizer invoking the given command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<Vec<DynamicImage>> {
        let tmpdir = tempfile::TempDir::with_prefix("pdftoppm")
            .map_err(|e| PdfError::Rasterizer(format!("cannot create temp dir: {}", e)))?;
        let input_path = tmpdir.path().join("input.pdf");
        std::fs::write(&input_path, pdf)
            .map_err(|e| PdfError::Rasterizer(format!("cannot write PDF: {}", e)))?;

        let output = Command::new(&self.command)
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-png")
            .arg(&input_path)
            .arg(tmpdir.path().join("page"))
            .output()
            .map_err(|e| PdfError::Rasterizer(format!("cannot run {}: {}", self.command, e)))?;

        if !output.status.success() {
            return Err(PdfError::Rasterizer(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let pages = rendered_pages(tmpdir.path())
            .map_err(|e| PdfError::Rasterizer(format!("cannot list rendered pages: {}", e)))?;
        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }

        let mut images = Vec::with_capacity(pages.len());
        for path in &pages {
            trace!("Loading rendered page {}", path.display());
            let image = image::open(path)
                .map_err(|e| PdfError::ImageExtraction(format!("{}: {}", path.display(), e)))?;
            images.push(image);
        }

        debug!("Rendered {} pages at {} DPI", images.len(), dpi);
        Ok(images)
    }
}

/// List `page-N.png` files ordered by page number.
///
/// `pdftoppm` zero-pads the page number to the width of the page count,
/// so the numeric suffix is compared rather than the file name.
fn rendered_pages(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter_map(|path| {
            let stem = path.file_stem()?.to_str()?;
            let number = stem.strip_prefix("page-")?.parse().ok()?;
            (path.extension()? == "png").then_some((number, path))
        })
        .collect();

    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_pages_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-10.png", "page-02.png", "page-1.png", "input.pdf", "page-x.png"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let pages = rendered_pages(dir.path()).unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["page-1.png", "page-02.png", "page-10.png"]);
    }

    #[test]
    fn test_missing_command_is_rasterizer_error() {
        let rasterizer = PdftoppmRasterizer::new("definitely-not-pdftoppm");
        let result = rasterizer.rasterize(b"%PDF-1.5", 300);
        assert!(matches!(result, Err(PdfError::Rasterizer(_))));
    }
}
