//! Generative analysis via an external text-completion provider.
//!
//! Builds a review prompt from (code, language), invokes the provider, and
//! coerces its free-form output into the canonical result shape. This
//! component never consults the static analyzer or the cache; it either
//! produces a real result or fails with a typed error the orchestrator
//! recovers from.

pub mod provider;
pub mod repair;

pub use provider::{CompletionProvider, GeminiClient, GeminiOptions, ProviderError};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::language::Language;
use crate::result::AnalysisResult;

/// Failures of the generative analysis path. All of these are recovered
/// into a fallback result by the orchestrator, never surfaced as top-level
/// errors.
#[derive(Error, Debug)]
pub enum GenerativeError {
    #[error("no completion provider configured")]
    ProviderUnavailable,
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("provider returned output that could not be parsed")]
    MalformedOutput,
}

/// Adapter from a text-completion provider to structured analysis results.
pub struct GenerativeAnalyzer {
    provider: Arc<dyn CompletionProvider>,
}

impl GenerativeAnalyzer {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Request a generative review of the code sample.
    pub async fn analyze(
        &self,
        code: &str,
        language: Language,
    ) -> Result<AnalysisResult, GenerativeError> {
        let prompt = build_prompt(code, language);
        debug!(provider = self.provider.name(), "requesting generative analysis");

        let raw = self.provider.complete(&prompt).await?;

        match repair::parse_completion(&raw, code) {
            Some(result) => Ok(result),
            None => {
                warn!(
                    provider = self.provider.name(),
                    chars = raw.len(),
                    "completion could not be parsed into a result"
                );
                Err(GenerativeError::MalformedOutput)
            }
        }
    }

    /// Reachability probe, delegated to the provider.
    pub async fn probe(&self) -> Result<(), ProviderError> {
        self.provider.probe().await
    }
}

/// Build the review prompt: embeds the code and demands strict JSON in the
/// canonical result shape.
fn build_prompt(code: &str, language: Language) -> String {
    format!(
        r#"You are an expert code reviewer. Analyze the following {language} code and provide a comprehensive review.

Code to review:
```{language}
{code}
```

Provide your analysis in the following JSON format (IMPORTANT: Return ONLY valid JSON, no markdown):
{{
    "overall_quality": "X/10",
    "summary": "A clear, well-formatted summary with emojis for visual appeal. Use \n for line breaks.",
    "bugs": [
        {{"severity": "high/medium/low", "line": "line number", "issue": "description", "fix": "suggested fix"}}
    ],
    "improvements": [
        {{"category": "performance/readability/maintainability", "suggestion": "description", "example": "code example"}}
    ],
    "best_practices": [
        {{"practice": "description", "current": "what code does", "recommended": "what it should do"}}
    ],
    "security": [
        {{"risk": "description", "severity": "high/medium/low", "mitigation": "how to fix"}}
    ],
    "metrics": {{
        "complexity": "X/10",
        "readability": "X/10",
        "maintainability": "X/10"
    }}
}}

IMPORTANT:
- Return ONLY the JSON object, no markdown code blocks
- Use numeric scores like "8/10" for overall_quality and metrics
- Make summary engaging with emojis (🌟, ✅, ⚠️, 🐛, 🔒, 💡)
- Be specific and actionable"#,
        language = language,
        code = code
    )
}

/// Advisory readiness flag for the provider warm-up probe.
///
/// Nothing in the request pipeline blocks on this; it only feeds health
/// output and logs.
#[derive(Clone, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Probe the provider once on a background task and flip the readiness
/// flag when it answers.
pub fn spawn_warmup(provider: Arc<dyn CompletionProvider>) -> Readiness {
    let readiness = Readiness::default();
    let flag = Arc::clone(&readiness.0);

    tokio::spawn(async move {
        match provider.probe().await {
            Ok(()) => {
                flag.store(true, Ordering::Relaxed);
                info!(provider = provider.name(), "completion provider ready");
            }
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "provider warm-up probe failed");
            }
        }
    });

    readiness
}
