//! Page image preparation for OCR.

use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

/// Grayscale a page and, when `threshold` is set, binarize it.
///
/// Pixels brighter than the threshold become white, the rest black. The
/// result is returned as RGB since recognition models expect three
/// channels.
pub fn preprocess_page(image: &DynamicImage, threshold: Option<u8>) -> DynamicImage {
    let mut gray: GrayImage = image.to_luma8();

    if let Some(threshold) = threshold {
        for Luma([value]) in gray.pixels_mut() {
            *value = if *value > threshold { 255 } else { 0 };
        }
    }

    debug!(
        "Preprocessed page {}x{} (threshold {:?})",
        gray.width(),
        gray.height(),
        threshold
    );
    DynamicImage::ImageRgb8(DynamicImage::ImageLuma8(gray).to_rgb8())
}
