//! End-to-end tests for the analysis pipeline.
//!
//! Exercises the orchestrator with canned completion providers covering
//! the happy path, malformed model output, missing provider, caching, and
//! fingerprint stability.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use codecritic::cache::fingerprint;
use codecritic::config::AppConfig;
use codecritic::genai::{CompletionProvider, ProviderError};
use codecritic::language::Language;
use codecritic::orchestrator::{AnalysisRequest, AnalyzeError, Orchestrator};
use codecritic::result::Severity;
use codecritic::validate::{sanitize, ValidationError};

struct CannedProvider {
    response: String,
    calls: AtomicUsize,
}

impl CannedProvider {
    fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CompletionProvider for CannedProvider {
    fn name(&self) -> &str {
        "canned"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

fn orchestrator_without_provider() -> Orchestrator {
    Orchestrator::from_config(&AppConfig::default()).without_provider()
}

#[tokio::test]
async fn test_simple_function_scores_well() {
    let orchestrator = orchestrator_without_provider();
    let request = AnalysisRequest::new("def add(a, b): return a + b", "auto");

    let response = orchestrator.analyze(&request).await.unwrap();

    assert_eq!(response.detected_language, "Python");
    assert!(response.static_analysis.bugs.is_empty());
    assert!(response.static_analysis.security.is_empty());

    let score = response.static_analysis.overall_quality.value();
    assert!((7.0..=10.0).contains(&score), "score was {}", score);
}

#[tokio::test]
async fn test_eval_flagged_as_code_injection() {
    let orchestrator = orchestrator_without_provider();
    let request = AnalysisRequest::new(
        "def run(user_input):\n    return eval(user_input)",
        "python",
    );

    let response = orchestrator.analyze(&request).await.unwrap();
    let security = &response.static_analysis.security;

    assert_eq!(security.len(), 1);
    assert_eq!(security[0].severity, Severity::High);
    assert!(security[0].risk.contains("injection"));
    assert!(security[0].risk.contains("eval("));
}

#[tokio::test]
async fn test_prose_response_falls_back_to_static() {
    let provider = Arc::new(CannedProvider::new(
        "Honestly this code is fine, I wouldn't change a thing.",
    ));
    let orchestrator =
        Orchestrator::from_config(&AppConfig::default()).with_provider(provider.clone());

    let request = AnalysisRequest::new("def run(x):\n    return eval(x)", "python");
    let response = orchestrator.analyze(&request).await.unwrap();

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert!(response.ai_fallback);
    assert!(response.ai_analysis.is_fallback);
    assert_eq!(response.ai_analysis.bugs, response.static_analysis.bugs);
    assert_eq!(
        response.ai_analysis.security,
        response.static_analysis.security
    );
    assert_eq!(
        response.ai_analysis.metrics,
        response.static_analysis.metrics
    );
    assert!(response
        .ai_analysis
        .summary
        .contains(&response.static_analysis.summary));
}

#[tokio::test]
async fn test_partially_structured_response_is_repaired() {
    // Invalid JSON overall (trailing comma) but with extractable fields.
    let provider = Arc::new(CannedProvider::new(
        r#"{"overall_quality": "6/10", "summary": "Decent but undocumented",}"#,
    ));
    let orchestrator =
        Orchestrator::from_config(&AppConfig::default()).with_provider(provider);

    let request = AnalysisRequest::new("def add(a, b): return a + b", "auto");
    let response = orchestrator.analyze(&request).await.unwrap();

    assert!(!response.ai_fallback);
    assert_eq!(response.ai_analysis.overall_quality.to_string(), "6/10");
    assert_eq!(response.ai_analysis.summary, "Decent but undocumented");
    assert!(response.ai_analysis.bugs.is_empty());
}

#[tokio::test]
async fn test_well_formed_response_used_directly() {
    let provider = Arc::new(CannedProvider::new(
        r#"```json
{
    "overall_quality": 9,
    "summary": "🌟 Tidy and idiomatic.",
    "bugs": [],
    "improvements": [{"category": "readability", "suggestion": "name the constant", "example": "LIMIT = 10"}],
    "best_practices": [],
    "security": [],
    "metrics": {"complexity": "9/10", "readability": 9, "maintainability": 8.0}
}
```"#,
    ));
    let orchestrator =
        Orchestrator::from_config(&AppConfig::default()).with_provider(provider);

    let request = AnalysisRequest::new("def add(a, b): return a + b", "auto");
    let response = orchestrator.analyze(&request).await.unwrap();

    assert!(!response.ai_fallback);
    assert_eq!(response.ai_analysis.overall_quality.to_string(), "9/10");
    assert_eq!(response.ai_analysis.improvements.len(), 1);
    // Numeric metric values arrive normalized to the fraction format.
    let metrics = serde_json::to_value(&response.ai_analysis.metrics).unwrap();
    assert_eq!(metrics["readability"], "9/10");
    assert_eq!(metrics["maintainability"], "8/10");
}

#[tokio::test]
async fn test_identical_requests_hit_cache_without_second_provider_call() {
    let provider = Arc::new(CannedProvider::new(
        r#"{"overall_quality": "9/10", "summary": "fine"}"#,
    ));
    let orchestrator =
        Orchestrator::from_config(&AppConfig::default()).with_provider(provider.clone());

    let request = AnalysisRequest::new("def add(a, b): return a + b", "auto");

    let first = orchestrator.analyze(&request).await.unwrap();
    let second = orchestrator.analyze(&request).await.unwrap();

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(second.analysis_time, "0.00s (cached)");
    assert_eq!(second.static_analysis, first.static_analysis);
    assert_eq!(second.ai_analysis, first.ai_analysis);
}

#[tokio::test]
async fn test_validation_boundaries() {
    let orchestrator = orchestrator_without_provider();

    let nine = AnalysisRequest::new("123456789", "auto");
    let err = orchestrator.analyze(&nine).await.unwrap_err();
    assert!(matches!(
        err,
        AnalyzeError::Validation(ValidationError::TooShort { min: 10 })
    ));

    let ten = AnalysisRequest::new("1234567890", "auto");
    assert!(orchestrator.analyze(&ten).await.is_ok());

    let oversized = AnalysisRequest::new("x".repeat(50_001), "auto");
    let err = orchestrator.analyze(&oversized).await.unwrap_err();
    match err {
        AnalyzeError::Validation(ValidationError::TooLong { max, actual }) => {
            assert_eq!(max, 50_000);
            assert_eq!(actual, 50_001);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_fingerprint_stable_under_sanitation() {
    let original = "def add(a, b):\r\n    return a + b   \r\n";
    let clean = "def add(a, b):\n    return a + b";

    assert_eq!(sanitize(original), clean);
    assert_eq!(
        fingerprint(&sanitize(original), Language::Python),
        fingerprint(clean, Language::Python)
    );
}
