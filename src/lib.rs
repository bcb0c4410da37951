//! Codecritic - code review pipeline.
//!
//! Codecritic assesses the quality of a source-code snippet with two
//! independent analyzers: a deterministic, rule-based static analyzer and
//! a generative AI reviewer whose free-form output is coerced into the
//! same structured shape. When the generative model is unavailable or
//! unusable the static result is substituted transparently, clearly marked
//! as a fallback.
//!
//! # Architecture
//!
//! Data flows strictly downward through the pipeline; no component calls
//! back upward:
//!
//! - `language`: the supported-language set and its pattern tables
//! - `detect`: weighted multi-signal language identification
//! - `validate`: input sanitation and validation
//! - `analyzer`: table-driven rule checks, metrics, and scoring
//! - `genai`: prompt construction, provider call, output repair
//! - `cache`: fingerprint-keyed response cache with TTL
//! - `orchestrator`: the per-request state machine tying it together
//! - `batch`: the same pipeline applied across a directory tree
//! - `report`: output formatting (pretty, JSON)
//!
//! # Adding a Language
//!
//! Add a profile in `language.rs` and rule tables in `analyzer/rules.rs`;
//! no new code paths are needed.

pub mod analyzer;
pub mod batch;
pub mod cache;
pub mod cli;
pub mod config;
pub mod detect;
pub mod genai;
pub mod language;
pub mod orchestrator;
pub mod report;
pub mod result;
pub mod validate;

pub use analyzer::StaticAnalyzer;
pub use cache::{fingerprint, ResponseCache};
pub use config::AppConfig;
pub use detect::LanguageDetector;
pub use genai::{CompletionProvider, GenerativeAnalyzer, GenerativeError};
pub use language::Language;
pub use orchestrator::{AnalysisRequest, AnalyzeError, Orchestrator};
pub use result::{AnalysisResponse, AnalysisResult, Finding, MetricsSet, Severity};
pub use validate::{sanitize, CodeValidator, ValidationError};
