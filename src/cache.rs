//! Response cache keyed by a content fingerprint.
//!
//! In-memory map for the current process plus an optional JSON file layer
//! under the user cache directory, both honoring the same TTL. The cache
//! is an opaque key-value collaborator to the orchestrator: `get`/`set`
//! never fail, they just miss.

use directories::ProjectDirs;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::language::Language;
use crate::result::AnalysisResponse;

/// Default time-to-live for cached responses, in seconds.
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Fingerprint of a (sanitized code, resolved language) pair.
///
/// Identical pairs always produce identical keys, so requests differing
/// only in whitespace removed by sanitation collapse to the same entry.
pub fn fingerprint(code: &str, language: Language) -> String {
    let mut hasher = Md5::new();
    hasher.update(code.as_bytes());
    hasher.update(language.as_str().as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Clone, Serialize, Deserialize)]
struct CacheEntry {
    response: AnalysisResponse,
    /// Unix timestamp in seconds.
    timestamp: u64,
}

/// Memory + file cache for assembled responses.
pub struct ResponseCache {
    memory: RwLock<HashMap<String, CacheEntry>>,
    cache_dir: Option<PathBuf>,
    ttl_secs: u64,
}

impl ResponseCache {
    /// Create a memory-only cache.
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            memory: RwLock::new(HashMap::new()),
            cache_dir: None,
            ttl_secs,
        }
    }

    /// Create a cache that also persists entries to the user cache dir.
    pub fn with_file_layer(ttl_secs: u64) -> Self {
        let cache_dir =
            ProjectDirs::from("", "", "codecritic").map(|dirs| dirs.cache_dir().join("responses"));

        if let Some(ref dir) = cache_dir {
            let _ = fs::create_dir_all(dir);
        }

        Self {
            memory: RwLock::new(HashMap::new()),
            cache_dir,
            ttl_secs,
        }
    }

    /// Get a cached response if it exists and has not expired.
    pub fn get(&self, key: &str) -> Option<AnalysisResponse> {
        let now = current_timestamp();

        {
            let cache = self.memory.read().ok()?;
            if let Some(entry) = cache.get(key) {
                if now - entry.timestamp < self.ttl_secs {
                    return Some(entry.response.clone());
                }
            }
        }

        if let Some(entry) = self.read_file_cache(key) {
            if now - entry.timestamp < self.ttl_secs {
                // Promote to the memory layer.
                if let Ok(mut cache) = self.memory.write() {
                    cache.insert(key.to_string(), entry.clone());
                }
                return Some(entry.response);
            }
        }

        None
    }

    /// Store a response. Failures in the file layer are silent; the memory
    /// layer still serves the current process.
    pub fn set(&self, key: &str, response: &AnalysisResponse) {
        let entry = CacheEntry {
            response: response.clone(),
            timestamp: current_timestamp(),
        };

        if let Ok(mut cache) = self.memory.write() {
            cache.insert(key.to_string(), entry.clone());
        }

        self.write_file_cache(key, &entry);
    }

    fn read_file_cache(&self, key: &str) -> Option<CacheEntry> {
        let path = self.cache_file_path(key)?;
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn write_file_cache(&self, key: &str, entry: &CacheEntry) {
        if let Some(path) = self.cache_file_path(key) {
            if let Ok(content) = serde_json::to_string(entry) {
                let _ = fs::write(path, content);
            }
        }
    }

    fn cache_file_path(&self, key: &str) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", key)))
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}
