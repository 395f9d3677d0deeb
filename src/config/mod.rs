// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for Taxein

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::{Result, TaxeinError};

/// Folder used when a category key cannot be resolved.
pub const FALLBACK_FOLDER: &str = "Other";

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// AI engine configuration
    pub ai_engine: EngineConfig,

    /// Category set used for classification and folder naming
    #[serde(default)]
    pub categories: CategorySet,

    /// Prompt templates
    #[serde(default)]
    pub prompts: PromptConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EngineConfig {
    pub url: String,
    /// Default model, used when none is remembered or given on the CLI
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptConfig {
    pub classify: String,
}

/// One classification target: a human-facing key and its folder name.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Category {
    pub key: String,
    pub folder: String,
}

/// Ordered mapping of category keys to destination folder names,
/// with a designated catch-all for unclassifiable content.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CategorySet {
    categories: Vec<Category>,
    catch_all: String,
}

impl CategorySet {
    /// Build a validated category set.
    pub fn new(categories: Vec<Category>, catch_all: impl Into<String>) -> Result<Self> {
        let set = Self {
            categories,
            catch_all: catch_all.into(),
        };
        set.validate()?;
        Ok(set)
    }

    /// Check the invariants: unique keys, unique folders, known catch-all.
    ///
    /// Deserialized sets must be validated before use; `AppConfig::load`
    /// does this for the configuration file path.
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(TaxeinError::Config("category set is empty".to_string()));
        }

        let mut keys = HashSet::new();
        let mut folders = HashSet::new();
        for category in &self.categories {
            if !keys.insert(category.key.as_str()) {
                return Err(TaxeinError::Config(format!(
                    "duplicate category key: {}",
                    category.key
                )));
            }
            if !folders.insert(category.folder.as_str()) {
                return Err(TaxeinError::Config(format!(
                    "duplicate category folder: {}",
                    category.folder
                )));
            }
        }

        if !keys.contains(self.catch_all.as_str()) {
            return Err(TaxeinError::Config(format!(
                "catch-all category '{}' is not in the category set",
                self.catch_all
            )));
        }

        Ok(())
    }

    /// Category keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.categories.iter().any(|c| c.key == key)
    }

    /// Folder name for a category key, if the key is known.
    pub fn folder_for(&self, key: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.folder.as_str())
    }

    /// Key of the catch-all category.
    pub fn catch_all(&self) -> &str {
        &self.catch_all
    }

    /// Folder of the catch-all category.
    pub fn catch_all_folder(&self) -> &str {
        self.folder_for(&self.catch_all).unwrap_or(FALLBACK_FOLDER)
    }
}

// Default value functions
fn default_timeout() -> u64 {
    60
}

impl Default for CategorySet {
    fn default() -> Self {
        let categories = [
            ("Books", "Books"),
            ("Travel documents", "Travel"),
            ("Bookings", "Booking"),
            ("Medical documents", "Medical"),
            ("Financial documents", "Finance"),
            ("Legal documents", "Legal"),
            ("Scientific articles", "Science"),
            ("Business documents", "Business"),
            ("Other", "Other"),
        ];
        Self {
            categories: categories
                .into_iter()
                .map(|(key, folder)| Category {
                    key: key.to_string(),
                    folder: folder.to_string(),
                })
                .collect(),
            catch_all: "Other".to_string(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            classify: "Your task is to classify a document based on its content. \
                       Analyze the following text and decide which of these \
                       categories it belongs to:"
                .to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ai_engine: EngineConfig {
                url: "http://localhost:11434".to_string(),
                model: "phi4-mini".to_string(),
                timeout_secs: default_timeout(),
            },
            categories: CategorySet::default(),
            prompts: PromptConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str::<Self>(&content)
                .map_err(|e| TaxeinError::Config(format!("Failed to parse config: {}", e)))?
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Self::default()
        };

        config.categories.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories_are_valid() {
        let set = CategorySet::default();
        set.validate().unwrap();
        assert_eq!(set.catch_all(), "Other");
        assert_eq!(set.catch_all_folder(), "Other");
        assert_eq!(set.folder_for("Travel documents"), Some("Travel"));
        assert_eq!(set.folder_for("Nonexistent"), None);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let result = CategorySet::new(
            vec![
                Category {
                    key: "Books".to_string(),
                    folder: "Books".to_string(),
                },
                Category {
                    key: "Books".to_string(),
                    folder: "MoreBooks".to_string(),
                },
            ],
            "Books",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_folder_rejected() {
        let result = CategorySet::new(
            vec![
                Category {
                    key: "Books".to_string(),
                    folder: "Shared".to_string(),
                },
                Category {
                    key: "Legal documents".to_string(),
                    folder: "Shared".to_string(),
                },
            ],
            "Books",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_catch_all_rejected() {
        let result = CategorySet::new(
            vec![Category {
                key: "Books".to_string(),
                folder: "Books".to_string(),
            }],
            "Other",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = AppConfig::default();
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.ai_engine.url, config.ai_engine.url);
        assert_eq!(loaded.ai_engine.model, config.ai_engine.model);
        assert_eq!(loaded.categories.len(), config.categories.len());
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config.ai_engine.timeout_secs, 60);
    }
}
