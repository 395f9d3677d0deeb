// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Image text extraction via OCR
//!
//! OCR needs the system Tesseract/Leptonica libraries and is gated behind
//! the `ocr` cargo feature. Without it a readable image yields empty text,
//! which routes the file to the catch-all category downstream. Pictures
//! without any text legitimately yield empty text either way.

use std::path::Path;

use super::TextExtractor;
use crate::{Result, TaxeinError};

/// Extractor for image files
pub struct ImageExtractor;

impl TextExtractor for ImageExtractor {
    fn name(&self) -> &'static str {
        "image"
    }

    fn extensions(&self) -> &[&'static str] {
        &["png", "jpg", "jpeg"]
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let img = image::open(path)
            .map_err(|e| TaxeinError::Extraction(format!("Failed to decode image: {}", e)))?;

        recognize_text(path, img)
    }
}

#[cfg(feature = "ocr")]
fn recognize_text(path: &Path, img: image::DynamicImage) -> Result<String> {
    tracing::debug!("Running OCR on {}", path.display());

    // Grayscale input improves recognition on scans and screenshots.
    let gray = image::DynamicImage::ImageLuma8(img.grayscale().to_luma8());

    let mut buffer = Vec::new();
    gray.write_to(
        &mut std::io::Cursor::new(&mut buffer),
        image::ImageFormat::Png,
    )
    .map_err(|e| TaxeinError::Extraction(format!("Failed to re-encode image: {}", e)))?;

    let tess = tesseract::Tesseract::new(None, Some("eng"))
        .map_err(|e| TaxeinError::Extraction(format!("Failed to initialize Tesseract: {}", e)))?;
    let mut tess = tess
        .set_image_from_mem(&buffer)
        .map_err(|e| TaxeinError::Extraction(format!("Tesseract rejected image: {}", e)))?;
    let text = tess
        .get_text()
        .map_err(|e| TaxeinError::Extraction(format!("OCR failed: {}", e)))?;

    Ok(text)
}

#[cfg(not(feature = "ocr"))]
fn recognize_text(path: &Path, img: image::DynamicImage) -> Result<String> {
    use image::GenericImageView;

    let (width, height) = img.dimensions();
    tracing::info!(
        "Built without the 'ocr' feature; no text recognized for {}x{} image {}",
        width,
        height,
        path.display()
    );
    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undecodable_image_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_an_image.png");
        std::fs::write(&path, b"garbage bytes").unwrap();

        assert!(ImageExtractor.extract(&path).is_err());
    }

    #[cfg(not(feature = "ocr"))]
    #[test]
    fn test_valid_image_yields_empty_text_without_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.png");

        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([255, 255, 255]));
        img.save(&path).unwrap();

        assert_eq!(ImageExtractor.extract(&path).unwrap(), "");
    }
}
