// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Executing a finalized sorting plan
//!
//! Moves are applied in order with per-file failure tolerance: a move that
//! fails is logged and recorded, then the batch continues. Nothing is
//! rolled back; partial application is an accepted outcome.

use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::plan::MovePair;
use crate::progress::ProgressSink;

/// Outcome of one attempted move.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub error: Option<String>,
}

impl MoveOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate result of an apply run.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub outcomes: Vec<MoveOutcome>,
}

impl ApplyReport {
    pub fn moved(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.moved()
    }
}

/// Applies finalized plans.
pub struct Applier {
    progress: ProgressSink,
}

impl Applier {
    pub fn new(progress: ProgressSink) -> Self {
        Self { progress }
    }

    /// Move every pair into place, reporting progress per file.
    pub fn apply(&self, pairs: &[MovePair]) -> ApplyReport {
        let total = pairs.len();
        let mut report = ApplyReport::default();

        for (i, pair) in pairs.iter().enumerate() {
            let file_name = pair
                .source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| pair.source.display().to_string());
            self.progress
                .progress(i, total, format!("Moving: {}", file_name));

            let dest = pair.dest_dir.join(&file_name);
            let error = match move_file(&pair.source, &dest) {
                Ok(()) => {
                    info!("Moved {} to {}", file_name, pair.dest_dir.display());
                    None
                }
                Err(e) => {
                    error!("Failed to move {}: {}", file_name, e);
                    Some(e.to_string())
                }
            };

            report.outcomes.push(MoveOutcome {
                source: pair.source.clone(),
                dest,
                error,
            });

            self.progress
                .progress(i + 1, total, format!("Moved: {}", file_name));
        }

        self.progress.message("Sorting complete!");
        report
    }
}

/// Move a file, refusing to overwrite and falling back to copy + remove
/// when rename fails (e.g. across mount points).
fn move_file(source: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if dest.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("destination already exists: {}", dest.display()),
        ));
    }

    match std::fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(source, dest)?;
            std::fs::remove_file(source)
        }
    }
}
