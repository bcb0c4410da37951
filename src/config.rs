//! Configuration loading.
//!
//! Settings come from an optional YAML file (auto-discovered next to the
//! working directory) with environment variables supplying the provider
//! API key. Everything has a sensible default; a missing file is not an
//! error.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::cache::DEFAULT_TTL_SECS;
use crate::genai::GeminiOptions;
use crate::validate::{MAX_CODE_CHARS, MIN_CODE_CHARS};

/// Config file names searched in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["codecritic.yaml", ".codecritic.yaml"];

/// Environment variable holding the provider API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Generative provider settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// API key. Usually left unset here and supplied via the environment.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.95
}

fn default_top_k() -> u32 {
    40
}

fn default_max_output_tokens() -> u32 {
    2048
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl ProviderConfig {
    /// Resolve the API key: explicit config first, then the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }

    /// Client options derived from these settings.
    pub fn gemini_options(&self) -> GeminiOptions {
        GeminiOptions {
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Persist entries to the user cache directory as well.
    #[serde(default)]
    pub persist: bool,
}

fn default_true() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_ttl_secs(),
            persist: false,
        }
    }
}

/// Input validation limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    #[serde(default = "default_min_chars")]
    pub min_code_chars: usize,
    #[serde(default = "default_max_chars")]
    pub max_code_chars: usize,
}

fn default_min_chars() -> usize {
    MIN_CODE_CHARS
}

fn default_max_chars() -> usize {
    MAX_CODE_CHARS
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_code_chars: default_min_chars(),
            max_code_chars: default_max_chars(),
        }
    }
}

/// Batch mode settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Glob patterns for paths to skip (e.g. `**/vendor/**`).
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl AppConfig {
    /// Parse a config file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: AppConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from an explicit path, or discover one of the default file
    /// names, or fall back to defaults when no file exists.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::parse_file(path);
        }

        for name in CONFIG_FILE_NAMES {
            let path = Path::new(name);
            if path.exists() {
                return Self::parse_file(path);
            }
        }

        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.provider.model, "gemini-2.5-flash");
        assert_eq!(config.provider.timeout_ms, 30_000);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.limits.min_code_chars, 10);
        assert_eq!(config.limits.max_code_chars, 50_000);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "provider:\n  model: gemini-2.0-flash-exp\ncache:\n  ttl_secs: 60").unwrap();

        let config = AppConfig::parse_file(file.path()).unwrap();
        assert_eq!(config.provider.model, "gemini-2.0-flash-exp");
        assert_eq!(config.provider.top_k, 40);
        assert_eq!(config.cache.ttl_secs, 60);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.limits.min_code_chars, 10);
    }
}
