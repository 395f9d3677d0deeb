// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Best-effort text extraction for the supported file formats
//!
//! Extraction degrades, never aborts: a corrupt or unreadable file yields
//! empty text and a warning, an unsupported extension yields empty text and
//! an info log. The registry is the only caller-facing surface.

pub mod docx;
pub mod image;
pub mod pdf;
pub mod spreadsheet;

use std::path::Path;
use tracing::{info, warn};

use crate::Result;

/// Trait for per-format text extractors
pub trait TextExtractor: Send + Sync {
    /// Name of this extractor
    fn name(&self) -> &'static str;

    /// Lower-cased file extensions this extractor handles
    fn extensions(&self) -> &[&'static str];

    /// Extract plain text from a file. Errors are recovered by the registry.
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Registry dispatching on lower-cased file extension
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    /// Create a registry with all built-in extractors
    pub fn new() -> Self {
        Self {
            extractors: vec![
                Box::new(pdf::PdfExtractor),
                Box::new(docx::DocxExtractor),
                Box::new(spreadsheet::SpreadsheetExtractor),
                Box::new(image::ImageExtractor),
            ],
        }
    }

    /// The fixed allow-list of supported extensions
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        self.extractors
            .iter()
            .flat_map(|e| e.extensions().iter().copied())
            .collect()
    }

    /// Whether a path's extension is in the supported set
    pub fn supports(&self, path: &Path) -> bool {
        extension_of(path)
            .map(|ext| self.find(&ext).is_some())
            .unwrap_or(false)
    }

    fn find(&self, ext: &str) -> Option<&dyn TextExtractor> {
        self.extractors
            .iter()
            .find(|e| e.extensions().contains(&ext))
            .map(|e| e.as_ref())
    }

    /// Extract text from a file, degrading every failure to empty text.
    pub fn extract(&self, path: &Path) -> String {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let ext = match extension_of(path) {
            Some(ext) => ext,
            None => {
                info!("File without extension is not supported: {}", file_name);
                return String::new();
            }
        };

        let extractor = match self.find(&ext) {
            Some(e) => e,
            None => {
                info!("Extension .{} is not supported: {}", ext, file_name);
                return String::new();
            }
        };

        match extractor.extract(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to read {} with {} extractor: {}", file_name, extractor.name(), e);
                String::new()
            }
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}
