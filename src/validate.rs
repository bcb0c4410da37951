//! Input sanitation and validation.
//!
//! Sanitation always runs first and never fails; validation applies a fixed
//! rule order where the first failure wins. A separate diagnostic scan logs
//! shell/eval-style patterns but never rejects input.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::warn;

use crate::language::Language;

/// Default minimum code length after trimming.
pub const MIN_CODE_CHARS: usize = 10;
/// Default maximum raw code length.
pub const MAX_CODE_CHARS: usize = 50_000;

/// Client input problems. Surfaced verbatim; nothing is cached.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Code cannot be empty")]
    Empty,
    #[error("Code is too short. Please provide at least {min} characters")]
    TooShort { min: usize },
    #[error(
        "Code exceeds maximum length of {max} characters. Current length: {actual} characters"
    )]
    TooLong { max: usize, actual: usize },
    #[error("Unsupported language: {tag}")]
    UnsupportedLanguage { tag: String },
}

/// Patterns worth flagging in logs. Matching is observational only.
static DANGEROUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"rm\s+-rf",
        r"eval\s*\(",
        r"exec\s*\(",
        r"__import__",
        r"subprocess\.",
        r"os\.system",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){}", p)).expect("invalid dangerous pattern"))
    .collect()
});

/// Normalize a code sample: strip NUL bytes, convert all line endings to
/// `\n`, and trim trailing whitespace. Never fails.
pub fn sanitize(code: &str) -> String {
    code.replace('\0', "")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .trim_end()
        .to_string()
}

/// Rejects malformed or oversized input before any analysis runs.
#[derive(Debug, Clone)]
pub struct CodeValidator {
    min_chars: usize,
    max_chars: usize,
}

impl Default for CodeValidator {
    fn default() -> Self {
        Self {
            min_chars: MIN_CODE_CHARS,
            max_chars: MAX_CODE_CHARS,
        }
    }
}

impl CodeValidator {
    pub fn new(min_chars: usize, max_chars: usize) -> Self {
        Self {
            min_chars,
            max_chars,
        }
    }

    /// Validate a (sanitized) code sample and its requested language tag.
    ///
    /// Returns the parsed language for an explicit tag, or `None` when the
    /// caller asked for auto-detection.
    pub fn validate(
        &self,
        code: &str,
        language: &str,
    ) -> Result<Option<Language>, ValidationError> {
        let trimmed = code.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        if trimmed.len() < self.min_chars {
            return Err(ValidationError::TooShort {
                min: self.min_chars,
            });
        }

        if code.len() > self.max_chars {
            return Err(ValidationError::TooLong {
                max: self.max_chars,
                actual: code.len(),
            });
        }

        self.scan_dangerous_patterns(code);

        if language == "auto" {
            return Ok(None);
        }

        match Language::from_tag(language) {
            Some(lang) => Ok(Some(lang)),
            None => Err(ValidationError::UnsupportedLanguage {
                tag: language.to_string(),
            }),
        }
    }

    /// Log any dangerous-looking patterns. A match never rejects the input.
    fn scan_dangerous_patterns(&self, code: &str) {
        let found: Vec<&str> = DANGEROUS_PATTERNS
            .iter()
            .filter(|p| p.is_match(code))
            .map(|p| p.as_str())
            .collect();

        if !found.is_empty() {
            warn!(patterns = ?found, "potentially dangerous patterns detected in input");
        }
    }
}
