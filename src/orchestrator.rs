//! Request orchestration.
//!
//! Drives the linear per-request pipeline: validate, resolve the language,
//! consult the cache, run both analyzers, assemble and cache the response.
//! Generative failures degrade into a clearly-marked fallback; validation
//! failures terminate the request with nothing cached.

use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analyzer::StaticAnalyzer;
use crate::cache::{fingerprint, ResponseCache};
use crate::config::AppConfig;
use crate::detect::LanguageDetector;
use crate::genai::{
    spawn_warmup, CompletionProvider, GeminiClient, GenerativeAnalyzer, Readiness,
};
use crate::result::{AnalysisResponse, AnalysisResult};
use crate::validate::{sanitize, CodeValidator, ValidationError};

/// Top-level failures of the analysis pipeline.
///
/// Generative problems never appear here; they are recovered into fallback
/// results. Validation errors go back to the caller verbatim; internal
/// errors are defects, logged with context and surfaced generically.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("internal error: {0}")]
    Internal(String),
}

/// One analysis request: the raw code and a language tag ("auto" to let
/// the detector decide).
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub code: String,
    pub language: String,
}

impl AnalysisRequest {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
        }
    }
}

/// Why the generative result had to be substituted.
enum FallbackReason {
    NotConfigured,
    CallFailed(String),
}

/// The assembled pipeline. Services are constructed explicitly and shared
/// by reference; there is no hidden global state.
pub struct Orchestrator {
    validator: CodeValidator,
    detector: LanguageDetector,
    analyzer: StaticAnalyzer,
    generative: Option<GenerativeAnalyzer>,
    cache: Option<ResponseCache>,
    readiness: Option<Readiness>,
}

impl Orchestrator {
    /// Build the pipeline from configuration. The generative analyzer is
    /// only wired up when an API key is available; its warm-up probe runs
    /// on a background task and nothing waits for it.
    ///
    /// Must be called from within a tokio runtime when a provider is
    /// configured.
    pub fn from_config(config: &AppConfig) -> Self {
        let provider: Option<Arc<dyn CompletionProvider>> =
            config.provider.resolve_api_key().map(|key| {
                Arc::new(GeminiClient::new(key, config.provider.gemini_options()))
                    as Arc<dyn CompletionProvider>
            });

        if provider.is_none() {
            warn!("no provider API key found - AI analysis will fall back to static results");
        }

        let cache = config.cache.enabled.then(|| {
            if config.cache.persist {
                ResponseCache::with_file_layer(config.cache.ttl_secs)
            } else {
                ResponseCache::new(config.cache.ttl_secs)
            }
        });

        let readiness = provider.as_ref().map(|p| spawn_warmup(Arc::clone(p)));

        Self {
            validator: CodeValidator::new(
                config.limits.min_code_chars,
                config.limits.max_code_chars,
            ),
            detector: LanguageDetector::new(),
            analyzer: StaticAnalyzer::new(),
            generative: provider.map(GenerativeAnalyzer::new),
            cache,
            readiness,
        }
    }

    /// Swap in a specific provider (used by tests and embedders).
    pub fn with_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.readiness = Some(spawn_warmup(Arc::clone(&provider)));
        self.generative = Some(GenerativeAnalyzer::new(provider));
        self
    }

    /// Drop the generative path entirely.
    pub fn without_provider(mut self) -> Self {
        self.generative = None;
        self.readiness = None;
        self
    }

    /// Whether the generative provider is configured at all.
    pub fn provider_configured(&self) -> bool {
        self.generative.is_some()
    }

    /// Advisory readiness of the provider warm-up probe.
    pub fn provider_ready(&self) -> Option<bool> {
        self.readiness.as_ref().map(Readiness::is_ready)
    }

    /// Run the full pipeline for one request.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AnalyzeError> {
        let start = Instant::now();

        // Sanitize, then validate; the fingerprint is derived from the
        // sanitized form so whitespace-equivalent inputs share an entry.
        let code = sanitize(&request.code);
        let explicit = self.validator.validate(&code, &request.language)?;

        let language = explicit.unwrap_or_else(|| {
            let detected = self.detector.detect(&code);
            info!(language = %detected, "auto-detected language");
            detected
        });

        let cache_key = fingerprint(&code, language);

        if let Some(cache) = &self.cache {
            if let Some(mut hit) = cache.get(&cache_key) {
                info!(key = &cache_key[..8], "cache hit");
                hit.cached = true;
                hit.analysis_time = "0.00s (cached)".to_string();
                return Ok(hit);
            }
        }

        let static_result = self.analyzer.analyze(&code, language);
        debug!(score = %static_result.overall_quality, "static analysis finished");

        let (ai_result, ai_fallback) = match &self.generative {
            None => (
                fallback_result(&static_result, FallbackReason::NotConfigured),
                true,
            ),
            Some(generative) => match generative.analyze(&code, language).await {
                Ok(result) => (result, false),
                Err(e) => {
                    warn!(error = %e, "generative analysis failed - substituting static result");
                    (
                        fallback_result(&static_result, FallbackReason::CallFailed(e.to_string())),
                        true,
                    )
                }
            },
        };

        let response = AnalysisResponse {
            detected_language: language.display_name().to_string(),
            static_analysis: static_result,
            ai_analysis: ai_result,
            ai_fallback,
            cached: false,
            analysis_time: format!("{:.2}s", start.elapsed().as_secs_f64()),
        };

        if let Some(cache) = &self.cache {
            cache.set(&cache_key, &response);
        }

        info!(
            language = %language,
            ai_fallback,
            elapsed = %response.analysis_time,
            "analysis complete"
        );
        Ok(response)
    }
}

/// Build the substitute generative result from the static one.
///
/// Findings and metrics are copied verbatim; only the summary changes, and
/// it embeds the static summary so the caller still sees the assessment.
fn fallback_result(static_result: &AnalysisResult, reason: FallbackReason) -> AnalysisResult {
    let summary = match reason {
        FallbackReason::NotConfigured => format!(
            "🔑 AI Provider Not Configured\n\n📊 Showing Static Analysis Results as Fallback:\n{}",
            static_result.summary
        ),
        FallbackReason::CallFailed(error) => format!(
            "⚠️ AI Analysis Unavailable: {}\n\n📊 Showing Static Analysis Results as Fallback:\n{}",
            error, static_result.summary
        ),
    };

    AnalysisResult {
        overall_quality: static_result.overall_quality,
        summary,
        bugs: static_result.bugs.clone(),
        improvements: static_result.improvements.clone(),
        best_practices: static_result.best_practices.clone(),
        security: static_result.security.clone(),
        metrics: static_result.metrics.clone(),
        is_fallback: true,
    }
}
