// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Persisted model preference
//!
//! The only state kept across runs: the last model name the user confirmed,
//! stored as a small JSON record next to the working directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::Result;

/// Default preference file name.
pub const PREFS_FILE: &str = "last_model.json";

#[derive(Debug, Serialize, Deserialize)]
struct PrefsRecord {
    last_model: String,
}

/// Reader/writer for the remembered model name.
pub struct ModelPrefs {
    path: PathBuf,
}

impl ModelPrefs {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Preference file in the current working directory.
    pub fn default_location() -> Self {
        Self::new(PREFS_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last remembered model name, if a readable record exists.
    pub fn load(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<PrefsRecord>(&content) {
            Ok(record) => Some(record.last_model),
            Err(e) => {
                debug!("Ignoring unreadable prefs file {:?}: {}", self.path, e);
                None
            }
        }
    }

    /// Remember a model name.
    pub fn save(&self, model: &str) -> Result<()> {
        let record = PrefsRecord {
            last_model: model.to_string(),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&record)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = ModelPrefs::new(dir.path().join(PREFS_FILE));

        assert_eq!(prefs.load(), None);
        prefs.save("phi4-mini").unwrap();
        assert_eq!(prefs.load(), Some("phi4-mini".to_string()));
    }

    #[test]
    fn test_corrupt_record_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PREFS_FILE);
        std::fs::write(&path, "{not json").unwrap();

        let prefs = ModelPrefs::new(path);
        assert_eq!(prefs.load(), None);
    }
}
