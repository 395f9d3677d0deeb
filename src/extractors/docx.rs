// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! DOCX text extraction
//!
//! A DOCX file is a zip archive; the document body lives in
//! `word/document.xml` with the visible text inside `w:t` runs.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;

use super::TextExtractor;
use crate::{Result, TaxeinError};

/// Extractor for DOCX files
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn name(&self) -> &'static str {
        "docx"
    }

    fn extensions(&self) -> &[&'static str] {
        &["docx"]
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let file = std::fs::File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| TaxeinError::Extraction(format!("Failed to open DOCX archive: {}", e)))?;

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|e| TaxeinError::Extraction(format!("No document.xml in DOCX: {}", e)))?
            .read_to_string(&mut xml)?;

        parse_document_xml(&xml)
    }
}

fn parse_document_xml(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => {
                in_text_run = true;
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"t" => {
                in_text_run = false;
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"p" => {
                text.push('\n');
            }
            Ok(Event::Text(t)) if in_text_run => {
                let run = t
                    .unescape()
                    .map_err(|e| TaxeinError::Extraction(format!("Bad XML text run: {}", e)))?;
                text.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(TaxeinError::Extraction(format!(
                    "Malformed document.xml: {}",
                    e
                )))
            }
        }
    }

    Ok(text)
}
