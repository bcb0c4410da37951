//! Defensive parsing of generative model output.
//!
//! Model responses are supposed to be strict JSON but routinely arrive
//! wrapped in markdown fences, partially structured, or as plain prose.
//! Parsing is an ordered fallback chain: strict parse, then best-effort
//! field extraction, then give up with a typed failure at the caller.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::result::{AnalysisResult, MetricsSet, QualityScore, Score};

/// Maximum characters of raw output quoted into a synthesized summary.
const SUMMARY_EXCERPT_CHARS: usize = 500;

static QUALITY_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""overall_quality"\s*:\s*"?\s*([0-9]+(?:\.[0-9]+)?)\s*(?:/\s*10)?\s*"?"#)
        .expect("invalid extraction pattern")
});

static SUMMARY_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""summary"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("invalid extraction pattern")
});

/// Parse a raw completion into a result, or `None` when it is beyond
/// repair. `code` feeds the metric heuristics of the partial-extraction
/// step.
pub fn parse_completion(raw: &str, code: &str) -> Option<AnalysisResult> {
    let stripped = strip_code_fences(raw);

    if let Ok(mut result) = serde_json::from_str::<AnalysisResult>(stripped) {
        // The adapter decides fallback status, not the model.
        result.is_fallback = false;
        return Some(result);
    }

    extract_partial(raw, code)
}

/// Remove surrounding markdown code-fence markup, if any.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        return match rest.find("```") {
            Some(end) => rest[..end].trim(),
            None => rest.trim(),
        };
    }

    if let Some(start) = trimmed.find("```") {
        let rest = &trimmed[start + 3..];
        return match rest.find("```") {
            Some(end) => rest[..end].trim(),
            None => rest.trim(),
        };
    }

    trimmed
}

/// Best-effort extraction of `overall_quality` and `summary` from output
/// that failed the strict parse. Synthesizes a minimal result with empty
/// finding lists and heuristic metrics.
fn extract_partial(raw: &str, code: &str) -> Option<AnalysisResult> {
    let quality = QUALITY_FIELD
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(QualityScore::new);

    let summary = SUMMARY_FIELD
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| unescape(m.as_str()));

    if quality.is_none() && summary.is_none() {
        return None;
    }

    Some(AnalysisResult {
        overall_quality: quality.unwrap_or_else(|| QualityScore::new(8.0)),
        summary: summary.unwrap_or_else(|| excerpt(raw)),
        bugs: Vec::new(),
        improvements: Vec::new(),
        best_practices: Vec::new(),
        security: Vec::new(),
        metrics: heuristic_metrics(code),
        is_fallback: false,
    })
}

fn unescape(s: &str) -> String {
    s.replace("\\n", "\n").replace("\\\"", "\"").replace("\\\\", "\\")
}

fn excerpt(raw: &str) -> String {
    let preview: String = raw.trim().chars().take(SUMMARY_EXCERPT_CHARS).collect();
    format!("🤖 AI Analysis:\n\n{}...", preview)
}

/// Rough metric guesses so a partial result never reports "unknown":
/// loop-keyword density stands in for complexity, line length for
/// readability.
fn heuristic_metrics(code: &str) -> MetricsSet {
    let loop_hits: i64 = code
        .lines()
        .map(|line| {
            ["for", "while"]
                .iter()
                .filter(|k| line.contains(*k))
                .count() as i64
        })
        .sum();

    let non_empty: Vec<&str> = code.lines().filter(|l| !l.trim().is_empty()).collect();
    let avg_len = if non_empty.is_empty() {
        0.0
    } else {
        non_empty.iter().map(|l| l.len()).sum::<usize>() as f64 / non_empty.len() as f64
    };

    MetricsSet {
        complexity: Score::new(10 - 2 * loop_hits),
        readability: Score::new((10.0 - (avg_len - 40.0) / 10.0) as i64),
        maintainability: Score::new(7),
        extra: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{
        "overall_quality": "8/10",
        "summary": "Solid code.",
        "bugs": [{"severity": "medium", "line": "3", "issue": "loose equality", "fix": "use ==="}],
        "improvements": [],
        "best_practices": [],
        "security": [],
        "metrics": {"complexity": 9, "readability": "8/10", "maintainability": 7.0}
    }"#;

    #[test]
    fn test_strict_parse() {
        let result = parse_completion(WELL_FORMED, "x = 1").unwrap();
        assert_eq!(result.overall_quality.to_string(), "8/10");
        assert_eq!(result.bugs.len(), 1);
        assert_eq!(result.metrics.complexity.value(), 9);
        assert_eq!(result.metrics.maintainability.value(), 7);
        assert!(!result.is_fallback);
    }

    #[test]
    fn test_json_fence_stripped() {
        let fenced = format!("Here is my review:\n```json\n{}\n```\nHope it helps!", WELL_FORMED);
        let result = parse_completion(&fenced, "x = 1").unwrap();
        assert_eq!(result.summary, "Solid code.");
    }

    #[test]
    fn test_bare_fence_stripped() {
        let fenced = format!("```\n{}\n```", WELL_FORMED);
        let result = parse_completion(&fenced, "x = 1").unwrap();
        assert_eq!(result.summary, "Solid code.");
    }

    #[test]
    fn test_numeric_scores_normalized() {
        let json = r#"{"overall_quality": 7, "summary": "ok", "metrics": {"complexity": 6.8, "readability": 8, "maintainability": "9"}}"#;
        let result = parse_completion(json, "x = 1").unwrap();
        assert_eq!(result.overall_quality.to_string(), "7/10");
        let metrics = serde_json::to_value(&result.metrics).unwrap();
        assert_eq!(metrics["complexity"], "6/10");
        assert_eq!(metrics["readability"], "8/10");
        assert_eq!(metrics["maintainability"], "9/10");
    }

    #[test]
    fn test_partial_extraction_from_broken_json() {
        // Trailing comma makes this invalid JSON; field extraction kicks in.
        let broken = r#"{"overall_quality": "6/10", "summary": "Needs work on error handling",}"#;
        let result = parse_completion(broken, "for x in xs:\n    print(x)").unwrap();
        assert_eq!(result.overall_quality.to_string(), "6/10");
        assert_eq!(result.summary, "Needs work on error handling");
        assert!(result.bugs.is_empty());
        // Heuristic metrics are filled in rather than left unknown.
        assert!(result.metrics.complexity.value() >= 1);
    }

    #[test]
    fn test_plain_prose_is_unrepairable() {
        let prose = "This code looks fine to me. Nice work on the error handling!";
        assert!(parse_completion(prose, "x = 1").is_none());
    }

    #[test]
    fn test_model_cannot_claim_fallback() {
        let json = r#"{"overall_quality": 8, "summary": "ok", "is_fallback": true}"#;
        let result = parse_completion(json, "x = 1").unwrap();
        assert!(!result.is_fallback);
    }

    #[test]
    fn test_heuristic_metrics_in_range() {
        let loopy = "for i in range(10):\n    while True:\n        for j in range(i):\n            pass";
        let metrics = heuristic_metrics(loopy);
        assert!((1..=10).contains(&metrics.complexity.value()));
        assert!((1..=10).contains(&metrics.readability.value()));
    }
}
