//! Automatic language identification.
//!
//! Scores a code sample against every language profile and picks the best
//! match. Deliberately cheap and deterministic: the result only steers
//! which rule set runs next, and the caller always sees it and can
//! override.

use tracing::debug;

use crate::language::{profiles, Language, DEFAULT_LANGUAGE};

/// Weighted multi-signal language classifier.
#[derive(Debug, Default)]
pub struct LanguageDetector;

impl LanguageDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect the language of a code sample.
    ///
    /// Never fails: empty or signal-free input falls back to the default
    /// language. Ties break in registration order (first registered wins).
    pub fn detect(&self, code: &str) -> Language {
        if code.trim().is_empty() {
            return DEFAULT_LANGUAGE;
        }

        let code_lower = code.to_lowercase();

        let mut best: Option<(Language, u32)> = None;
        for profile in profiles() {
            let mut score = 0u32;

            // Keywords score double: they are the stronger signal.
            for keyword in profile.keywords {
                if code_lower.contains(&keyword.to_lowercase()) {
                    score += 2;
                }
            }

            for pattern in &profile.syntax {
                if pattern.is_match(code) {
                    score += 1;
                }
            }

            // Strict greater-than keeps the first registered language on ties.
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((profile.language, score));
            }
        }

        if let Some((language, score)) = best {
            if score > 0 {
                debug!(language = %language, score, "language detected");
                return language;
            }
        }

        self.detect_by_override(code, &code_lower)
    }

    /// Ordered hand-written heuristics for samples where no profile scored.
    fn detect_by_override(&self, code: &str, code_lower: &str) -> Language {
        if code.contains("<?php") {
            Language::Php
        } else if code.contains("def ") && code.contains(':') {
            Language::Python
        } else if code.contains("function ") && code.contains('{') {
            Language::Javascript
        } else if code.contains("#include") {
            Language::Cpp
        } else if code.contains("public class") && code.contains("void ") {
            Language::Java
        } else if code_lower.contains("<html") || code_lower.contains("<!doctype") {
            Language::Html
        } else {
            DEFAULT_LANGUAGE
        }
    }
}
