// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Building a sorting plan for a source tree
//!
//! Planning is read-only on the filesystem apart from the eager creation of
//! the destination category folders. Files are visited in a deterministic
//! order; a file whose extraction yields no text goes straight to the
//! catch-all category without a model round-trip.

use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::classifier::Classifier;
use crate::config::CategorySet;
use crate::extractors::ExtractorRegistry;
use crate::plan::SortingPlan;
use crate::progress::ProgressSink;
use crate::{Result, TaxeinError};

/// Builds sorting plans from a source directory.
pub struct Planner {
    registry: ExtractorRegistry,
    categories: CategorySet,
    progress: ProgressSink,
}

impl Planner {
    pub fn new(categories: CategorySet, progress: ProgressSink) -> Self {
        Self {
            registry: ExtractorRegistry::new(),
            categories,
            progress,
        }
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// Build a plan for every supported file under `source_root`.
    ///
    /// Creates one folder per category under `target_root` (catch-all
    /// included, even if it stays empty) and classifies each file without
    /// moving anything.
    pub async fn plan(
        &self,
        source_root: &Path,
        target_root: &Path,
        classifier: &dyn Classifier,
    ) -> Result<SortingPlan> {
        if !source_root.is_dir() {
            return Err(TaxeinError::Config(format!(
                "source directory does not exist: {}",
                source_root.display()
            )));
        }
        // Plan entries carry absolute paths so later edits and the apply
        // phase are independent of the working directory.
        let source_root = source_root.canonicalize()?;

        self.progress.message("Creating category folders...");
        std::fs::create_dir_all(target_root)?;
        let target_root = target_root.canonicalize()?;
        for category in self.categories.iter() {
            std::fs::create_dir_all(target_root.join(&category.folder))?;
        }

        let files = self.collect_files(&source_root);
        let total = files.len();
        info!("Found {} files to sort under {}", total, source_root.display());
        self.progress
            .message(format!("Found {} files to sort.", total));

        let mut plan = SortingPlan::new(target_root, self.categories.clone());

        for (i, file) in files.iter().enumerate() {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            self.progress
                .progress(i, total, format!("Processing: {}", file_name));

            let text = self.registry.extract(file);

            let (category, message) = if text.trim().is_empty() {
                let catch_all = self.categories.catch_all().to_string();
                let message = format!(
                    "No text extracted from {}. Proposed category '{}'.",
                    file_name, catch_all
                );
                (catch_all, message)
            } else {
                let category = classifier.classify(&text).await;
                let message = format!("'{}' classified as '{}'.", file_name, category);
                (category, message)
            };
            info!("{}", message);

            let size_bytes = std::fs::metadata(file).map(|m| m.len()).unwrap_or(0);
            plan.push(file.clone(), category, size_bytes);

            self.progress.progress(i + 1, total, message);
        }

        self.progress.message("Planning complete.");
        Ok(plan)
    }

    /// Enumerate supported files under `root` in a stable order.
    fn collect_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && self.registry.supports(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                }
            }
        }

        files
    }
}
