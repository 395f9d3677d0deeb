// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! The sorting plan: proposed moves, edits, and commit-time finalization
//!
//! A plan is produced once per run by the planner, optionally edited
//! (reassign, exclude, restore) and then finalized into the move list the
//! applier executes. Entries are addressed by their stable ordinal index,
//! so a display layer may re-sort freely without losing the mapping back
//! to the underlying entry.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::CategorySet;
use crate::{Result, TaxeinError};

/// One proposed move.
///
/// `category` is `None` while the entry is excluded; `last_confirmed`
/// remembers the key to restore on un-exclusion.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub index: usize,
    pub source: PathBuf,
    pub file_name: String,
    pub extension: String,
    pub size_bytes: u64,
    category: Option<String>,
    last_confirmed: String,
}

impl PlanEntry {
    /// Current category key, or `None` when the entry is excluded.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn excluded(&self) -> bool {
        self.category.is_none()
    }

    /// Key that will be restored when the entry is un-excluded.
    pub fn last_confirmed(&self) -> &str {
        &self.last_confirmed
    }
}

/// A finalized (source, destination folder) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePair {
    pub source: PathBuf,
    pub dest_dir: PathBuf,
}

/// Ordered sequence of proposed moves for one planner run.
#[derive(Debug, Clone, Serialize)]
pub struct SortingPlan {
    target_root: PathBuf,
    categories: CategorySet,
    entries: Vec<PlanEntry>,
}

impl SortingPlan {
    pub fn new(target_root: impl Into<PathBuf>, categories: CategorySet) -> Self {
        Self {
            target_root: target_root.into(),
            categories,
            entries: Vec::new(),
        }
    }

    /// Append an entry for a source file with its proposed category.
    pub fn push(&mut self, source: PathBuf, category: String, size_bytes: u64) {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = source
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        self.entries.push(PlanEntry {
            index: self.entries.len(),
            source,
            file_name,
            extension,
            size_bytes,
            category: Some(category.clone()),
            last_confirmed: category,
        });
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Reassign an entry to another category key. Clears exclusion and
    /// updates the key restored by later exclusion round-trips.
    pub fn reassign(&mut self, index: usize, key: &str) -> Result<()> {
        if !self.categories.contains(key) {
            return Err(TaxeinError::Plan(format!("unknown category key: {}", key)));
        }
        let entry = self.entry_mut(index)?;
        entry.category = Some(key.to_string());
        entry.last_confirmed = key.to_string();
        Ok(())
    }

    /// Exclude an entry from the plan.
    pub fn exclude(&mut self, index: usize) -> Result<()> {
        self.entry_mut(index)?.category = None;
        Ok(())
    }

    /// Un-exclude an entry, restoring its last confirmed category.
    pub fn restore(&mut self, index: usize) -> Result<()> {
        let entry = self.entry_mut(index)?;
        entry.category = Some(entry.last_confirmed.clone());
        Ok(())
    }

    /// Destination directory for a category key, with unknown keys falling
    /// back to the catch-all folder.
    pub fn destination_for(&self, key: &str) -> PathBuf {
        let folder = self
            .categories
            .folder_for(key)
            .unwrap_or_else(|| self.categories.catch_all_folder());
        self.target_root.join(folder)
    }

    /// Produce the ordered move list for the applier: non-excluded entries
    /// only, destinations recomputed from the current categories.
    pub fn finalize(&self) -> Vec<MovePair> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry.category().map(|key| MovePair {
                    source: entry.source.clone(),
                    dest_dir: self.destination_for(key),
                })
            })
            .collect()
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut PlanEntry> {
        let len = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or_else(|| TaxeinError::Plan(format!("entry index {} out of range 0..{}", index, len)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> SortingPlan {
        let mut plan = SortingPlan::new("/target", CategorySet::default());
        plan.push(PathBuf::from("/src/ticket.pdf"), "Travel documents".to_string(), 1024);
        plan.push(PathBuf::from("/src/report.xlsx"), "Financial documents".to_string(), 2048);
        plan
    }

    #[test]
    fn test_push_fills_display_metadata() {
        let plan = sample_plan();
        let entry = &plan.entries()[0];
        assert_eq!(entry.index, 0);
        assert_eq!(entry.file_name, "ticket.pdf");
        assert_eq!(entry.extension, "pdf");
        assert_eq!(entry.size_bytes, 1024);
        assert_eq!(entry.category(), Some("Travel documents"));
        assert!(!entry.excluded());
    }

    #[test]
    fn test_exclude_shows_sentinel_and_restore_recovers() {
        let mut plan = sample_plan();

        plan.exclude(0).unwrap();
        assert!(plan.entries()[0].excluded());
        assert_eq!(plan.entries()[0].category(), None);

        plan.restore(0).unwrap();
        assert_eq!(plan.entries()[0].category(), Some("Travel documents"));
    }

    #[test]
    fn test_restore_returns_last_confirmed_not_original() {
        let mut plan = sample_plan();

        plan.reassign(0, "Books").unwrap();
        plan.exclude(0).unwrap();
        plan.restore(0).unwrap();

        // The reassigned key comes back, not the planner's original one.
        assert_eq!(plan.entries()[0].category(), Some("Books"));
    }

    #[test]
    fn test_reassign_unknown_key_rejected() {
        let mut plan = sample_plan();
        assert!(plan.reassign(0, "No such category").is_err());
        assert!(plan.reassign(9, "Books").is_err());
    }

    #[test]
    fn test_finalize_skips_excluded_and_recomputes_destinations() {
        let mut plan = sample_plan();
        plan.reassign(1, "Legal documents").unwrap();
        plan.exclude(0).unwrap();

        let pairs = plan.finalize();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].source, PathBuf::from("/src/report.xlsx"));
        assert_eq!(pairs[0].dest_dir, PathBuf::from("/target/Legal"));
    }

    #[test]
    fn test_unknown_key_falls_back_to_catch_all_folder() {
        let plan = sample_plan();
        assert_eq!(
            plan.destination_for("Mystery"),
            PathBuf::from("/target/Other")
        );
    }
}
