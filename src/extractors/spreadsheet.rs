// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Spreadsheet text extraction
//!
//! Concatenates the cell text of every sheet in the workbook.

use calamine::{open_workbook_auto, Reader};
use std::path::Path;

use super::TextExtractor;
use crate::{Result, TaxeinError};

/// Extractor for spreadsheet files
pub struct SpreadsheetExtractor;

impl TextExtractor for SpreadsheetExtractor {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn extensions(&self) -> &[&'static str] {
        &["xlsx", "xls", "ods"]
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| TaxeinError::Extraction(format!("Failed to open spreadsheet: {}", e)))?;

        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        let mut text = String::new();

        for sheet_name in &sheet_names {
            if let Ok(range) = workbook.worksheet_range(sheet_name) {
                for row in range.rows() {
                    let row_text: Vec<String> = row.iter().map(|c| c.to_string()).collect();
                    text.push_str(&row_text.join("\t"));
                    text.push('\n');
                }
            }
        }

        Ok(text)
    }
}
