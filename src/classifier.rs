// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Text classification against a fixed category set
//!
//! The model is asked to answer with exactly one category name, but in
//! practice replies arrive wrapped in extra words ("Category: X"), quotes,
//! or partial reasoning traces. Normalization degrades through exact match,
//! substring match and longest-substring match before falling back to the
//! catch-all category. A classification never fails the batch.

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::config::CategorySet;
use crate::ollama::OllamaClient;

/// Maximum number of characters of extracted text sent to the model.
const MAX_TEXT_CHARS: usize = 4000;

/// Marker closing a model's reasoning segment. Everything up to and
/// including it is discarded before normalization.
const REASONING_END: &str = "</think>";

/// Classifies extracted text into a category key.
///
/// Infallible by contract: implementations map every failure to the
/// catch-all key rather than returning an error.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> String;
}

/// Classifier backed by a local Ollama chat model.
pub struct LlmClassifier {
    client: OllamaClient,
    model: String,
    categories: CategorySet,
    preamble: String,
}

impl LlmClassifier {
    pub fn new(
        client: OllamaClient,
        model: impl Into<String>,
        categories: CategorySet,
        preamble: impl Into<String>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            categories,
            preamble: preamble.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_prompt(&self, text: &str) -> String {
        let keys = self
            .categories
            .keys()
            .map(|k| format!("'{}'", k))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{preamble} {keys}. \
             Respond with ONLY ONE category name from the list, and nothing else.\n\n\
             --- Document text ---\n\
             {body}\n\
             --- End of text ---\n\n\
             Category:",
            preamble = self.preamble,
            keys = keys,
            body = truncate_chars(text, MAX_TEXT_CHARS),
        )
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, text: &str) -> String {
        let prompt = self.build_prompt(text);

        match self.client.chat(&self.model, &prompt).await {
            Ok(response) => normalize_response(&response, &self.categories),
            Err(e) => {
                error!("Classification request failed: {}", e);
                self.categories.catch_all().to_string()
            }
        }
    }
}

/// Resolve a free-text model response to a category key.
///
/// Applied in order, first match wins: strip the reasoning segment, fold
/// case and quotes, exact key match, substring match (unique hit, then
/// longest hit), catch-all.
pub fn normalize_response(response: &str, categories: &CategorySet) -> String {
    let answer = match response.find(REASONING_END) {
        Some(idx) => &response[idx + REASONING_END.len()..],
        None => response,
    };

    let folded = answer.trim().to_lowercase().replace(['\'', '"'], "");
    let folded = folded.trim();

    for key in categories.keys() {
        if key.to_lowercase() == folded {
            return key.to_string();
        }
    }

    let matches: Vec<&str> = categories
        .keys()
        .filter(|key| folded.contains(&key.to_lowercase()))
        .collect();

    match matches.len() {
        0 => {
            warn!(
                "Model returned an unexpected response: '{}'. Using catch-all category '{}'.",
                answer.trim(),
                categories.catch_all()
            );
            categories.catch_all().to_string()
        }
        1 => {
            info!(
                "Inexact match for response '{}', using category '{}'.",
                answer.trim(),
                matches[0]
            );
            matches[0].to_string()
        }
        _ => {
            // Several keys appear in the response; the longest is the most
            // specific. First wins on equal length.
            let mut best = matches[0];
            for key in &matches[1..] {
                if key.len() > best.len() {
                    best = key;
                }
            }
            info!(
                "Multiple categories {:?} found in response '{}', choosing the longest: '{}'.",
                matches,
                answer.trim(),
                best
            );
            best.to_string()
        }
    }
}

/// Truncate to a character count without splitting a UTF-8 code point.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> CategorySet {
        CategorySet::default()
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(
            normalize_response("Travel documents", &categories()),
            "Travel documents"
        );
    }

    #[test]
    fn test_exact_match_case_insensitive_with_quotes() {
        assert_eq!(
            normalize_response("  'TRAVEL Documents' ", &categories()),
            "Travel documents"
        );
    }

    #[test]
    fn test_substring_match() {
        assert_eq!(
            normalize_response("Category: Financial documents.", &categories()),
            "Financial documents"
        );
    }

    #[test]
    fn test_multiple_matches_prefers_longest() {
        let set = CategorySet::new(
            vec![
                crate::config::Category {
                    key: "Documents".to_string(),
                    folder: "Docs".to_string(),
                },
                crate::config::Category {
                    key: "Travel documents".to_string(),
                    folder: "Travel".to_string(),
                },
                crate::config::Category {
                    key: "Other".to_string(),
                    folder: "Other".to_string(),
                },
            ],
            "Other",
        )
        .unwrap();

        assert_eq!(
            normalize_response("This looks like travel documents to me", &set),
            "Travel documents"
        );
    }

    #[test]
    fn test_reasoning_segment_is_discarded() {
        let response =
            "I think this might be a book about travel documents...</think>Financial documents";
        assert_eq!(
            normalize_response(response, &categories()),
            "Financial documents"
        );
    }

    #[test]
    fn test_reasoning_segment_only_match_before_marker() {
        // The only category mention sits inside the reasoning segment and
        // must not be considered.
        let response = "Travel documents</think>no idea";
        assert_eq!(normalize_response(response, &categories()), "Other");
    }

    #[test]
    fn test_no_match_falls_back_to_catch_all() {
        assert_eq!(
            normalize_response("I cannot classify this", &categories()),
            "Other"
        );
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // Multi-byte characters must not be split.
        assert_eq!(truncate_chars("ééééé", 3), "ééé");
    }

    #[test]
    fn test_prompt_contains_keys_and_truncated_text() {
        let client = OllamaClient::new("http://127.0.0.1:1", 5);
        let classifier = LlmClassifier::new(
            client,
            "phi4-mini",
            categories(),
            "Classify the following text into one of these categories:",
        );

        let long_text = "x".repeat(MAX_TEXT_CHARS + 100);
        let prompt = classifier.build_prompt(&long_text);

        assert!(prompt.contains("'Travel documents'"));
        assert!(prompt.contains("'Other'"));
        assert!(!prompt.contains(&"x".repeat(MAX_TEXT_CHARS + 1)));
    }

    #[tokio::test]
    async fn test_network_failure_returns_catch_all() {
        // Nothing listens on this port: the request fails and the
        // classifier must degrade to the catch-all without erroring.
        let client = OllamaClient::new("http://127.0.0.1:1", 5);
        let classifier = LlmClassifier::new(client, "phi4-mini", categories(), "Classify:");

        assert_eq!(classifier.classify("some invoice text").await, "Other");
    }
}
