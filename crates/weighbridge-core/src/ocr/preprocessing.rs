//! Fixed page preprocessing for OCR.
//!
//! Every page goes through the same four steps: luminance conversion,
//! contrast stretch by a factor of 2.0 around the mean, a 3x3 sharpening
//! convolution, and binarization at 128. None of these is configurable.

use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

use crate::error::OcrError;

const CONTRAST_FACTOR: f32 = 2.0;
const BINARY_THRESHOLD: u8 = 128;

/// 3x3 sharpening kernel, applied with a divisor of 16.
const SHARPEN_KERNEL: [[i32; 3]; 3] = [[-2, -2, -2], [-2, 32, -2], [-2, -2, -2]];
const SHARPEN_SCALE: i32 = 16;

/// Image preprocessor for the OCR pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePreprocessor;

impl ImagePreprocessor {
    /// Create a new preprocessor.
    pub fn new() -> Self {
        Self
    }

    /// Normalize a page image into a black-on-white binary image.
    pub fn process(&self, image: &DynamicImage) -> Result<GrayImage, OcrError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(OcrError::Preprocessing("image has no pixels".to_string()));
        }

        let gray = to_luminance(image)?;
        let contrasted = enhance_contrast(&gray, CONTRAST_FACTOR);
        let sharpened = sharpen(&contrasted);
        let binary = binarize(&sharpened, BINARY_THRESHOLD);

        debug!("Preprocessed page: {}x{}", binary.width(), binary.height());
        Ok(binary)
    }
}

/// Convert to 8-bit luminance using ITU-R 601-2 weights.
///
/// Floating point images are refused rather than reinterpreted.
fn to_luminance(image: &DynamicImage) -> Result<GrayImage, OcrError> {
    match image {
        DynamicImage::ImageLuma8(gray) => Ok(gray.clone()),
        DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => Ok(image.to_luma8()),
        DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => {
            let rgb = image.to_rgb8();
            Ok(GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                let [r, g, b] = rgb.get_pixel(x, y).0;
                let l = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
                Luma([l as u8])
            }))
        }
        other => Err(OcrError::UnsupportedImage(format!("{:?}", other.color()))),
    }
}

/// Scale each pixel's distance from the rounded image mean by `factor`.
fn enhance_contrast(image: &GrayImage, factor: f32) -> GrayImage {
    let count = image.width() as u64 * image.height() as u64;
    let sum: u64 = image.pixels().map(|p| p[0] as u64).sum();
    let mean = (sum as f64 / count as f64 + 0.5) as i32;

    let mut result = image.clone();
    for pixel in result.pixels_mut() {
        let value = mean as f32 + factor * (pixel[0] as i32 - mean) as f32;
        pixel[0] = value.clamp(0.0, 255.0) as u8;
    }
    result
}

/// Apply the sharpening kernel; the one-pixel border is copied unchanged.
fn sharpen(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut result = image.clone();

    if width < 3 || height < 3 {
        return result;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut sum = 0i32;
            for (ky, row) in SHARPEN_KERNEL.iter().enumerate() {
                for (kx, weight) in row.iter().enumerate() {
                    let px = image.get_pixel(x + kx as u32 - 1, y + ky as u32 - 1)[0];
                    sum += weight * px as i32;
                }
            }
            let value = (sum + SHARPEN_SCALE / 2).div_euclid(SHARPEN_SCALE);
            result.put_pixel(x, y, Luma([value.clamp(0, 255) as u8]));
        }
    }

    result
}

/// Pixels brighter than `threshold` become background, the rest foreground.
fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    let mut result = image.clone();
    for pixel in result.pixels_mut() {
        pixel[0] = if pixel[0] > threshold { 255 } else { 0 };
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgb32FImage, RgbImage};

    #[test]
    fn test_luminance_weights() {
        let red = RgbImage::from_pixel(2, 2, Rgb([255, 0, 0]));
        let gray = to_luminance(&DynamicImage::ImageRgb8(red)).unwrap();
        assert_eq!(gray.get_pixel(0, 0)[0], 76);

        let white = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));
        let gray = to_luminance(&DynamicImage::ImageRgb8(white)).unwrap();
        assert_eq!(gray.get_pixel(1, 1)[0], 255);
    }

    #[test]
    fn test_float_images_are_rejected() {
        let image = DynamicImage::ImageRgb32F(Rgb32FImage::new(4, 4));
        let result = ImagePreprocessor::new().process(&image);
        assert!(matches!(result, Err(OcrError::UnsupportedImage(_))));
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let image = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(ImagePreprocessor::new().process(&image).is_err());
    }

    #[test]
    fn test_contrast_stretches_around_mean() {
        let mut image = GrayImage::new(2, 1);
        image.put_pixel(0, 0, Luma([100]));
        image.put_pixel(1, 0, Luma([200]));

        let result = enhance_contrast(&image, 2.0);
        assert_eq!(result.get_pixel(0, 0)[0], 50);
        assert_eq!(result.get_pixel(1, 0)[0], 250);
    }

    #[test]
    fn test_contrast_clips() {
        let mut image = GrayImage::new(2, 1);
        image.put_pixel(0, 0, Luma([0]));
        image.put_pixel(1, 0, Luma([255]));

        let result = enhance_contrast(&image, 2.0);
        assert_eq!(result.get_pixel(0, 0)[0], 0);
        assert_eq!(result.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn test_sharpen_uniform_image_unchanged() {
        let image = GrayImage::from_pixel(5, 5, Luma([90]));
        assert_eq!(sharpen(&image), image);
    }

    #[test]
    fn test_sharpen_boosts_isolated_pixel() {
        let mut image = GrayImage::from_pixel(3, 3, Luma([100]));
        image.put_pixel(1, 1, Luma([140]));

        let result = sharpen(&image);
        // (32 * 140 - 2 * 8 * 100) / 16 = 180
        assert_eq!(result.get_pixel(1, 1)[0], 180);
        assert_eq!(result.get_pixel(0, 0)[0], 100);
    }

    #[test]
    fn test_binarize_threshold_is_exclusive() {
        let mut image = GrayImage::new(3, 1);
        image.put_pixel(0, 0, Luma([128]));
        image.put_pixel(1, 0, Luma([129]));
        image.put_pixel(2, 0, Luma([0]));

        let result = binarize(&image, 128);
        assert_eq!(result.get_pixel(0, 0)[0], 0);
        assert_eq!(result.get_pixel(1, 0)[0], 255);
        assert_eq!(result.get_pixel(2, 0)[0], 0);
    }

    #[test]
    fn test_process_is_reproducible() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(16, 16, |x, y| {
            Rgb([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8])
        }));
        let preprocessor = ImagePreprocessor::new();

        let first = preprocessor.process(&image).unwrap();
        let second = preprocessor.process(&image).unwrap();
        assert_eq!(first, second);
        assert!(first.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}
