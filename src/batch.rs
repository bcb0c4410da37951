//! Batch analysis over a directory tree.
//!
//! Runs the same per-file pipeline as a single request for every code file
//! under a root, aggregating counts. Individual file failures are skipped,
//! never fatal to the batch.

use globset::{Glob, GlobSet, GlobSetBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::config::BatchConfig;
use crate::language::Language;
use crate::orchestrator::{AnalysisRequest, Orchestrator};
use crate::result::AnalysisResponse;

/// Directories never worth descending into.
const SKIPPED_DIRS: &[&str] = &[
    "vendor",
    "node_modules",
    "target",
    "dist",
    "build",
    "__pycache__",
];

/// One analyzed file.
pub struct FileReport {
    pub path: PathBuf,
    pub response: AnalysisResponse,
}

/// Aggregated outcome of a batch run.
pub struct BatchSummary {
    pub reports: Vec<FileReport>,
    /// Files that could not be read or failed validation.
    pub skipped: usize,
    /// Analyzed file counts per detected language display name.
    pub by_language: BTreeMap<String, usize>,
}

impl BatchSummary {
    /// Mean static overall score across analyzed files.
    pub fn average_score(&self) -> Option<f32> {
        if self.reports.is_empty() {
            return None;
        }
        let total: f32 = self
            .reports
            .iter()
            .map(|r| r.response.static_analysis.overall_quality.value())
            .sum();
        Some(total / self.reports.len() as f32)
    }
}

/// Analyze every recognized code file under `root`.
pub async fn run(
    orchestrator: &Orchestrator,
    root: &Path,
    config: &BatchConfig,
) -> anyhow::Result<BatchSummary> {
    let exclude = build_exclude_set(&config.exclude);
    let files = collect_files(root, &exclude)?;

    let progress = if files.len() > 1 {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("  {bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    let mut summary = BatchSummary {
        reports: Vec::new(),
        skipped: 0,
        by_language: BTreeMap::new(),
    };

    for path in files {
        if let Some(bar) = &progress {
            bar.set_message(
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );
        }

        match analyze_file(orchestrator, &path).await {
            Ok(response) => {
                *summary
                    .by_language
                    .entry(response.detected_language.clone())
                    .or_insert(0) += 1;
                summary.reports.push(FileReport { path, response });
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping file");
                summary.skipped += 1;
            }
        }

        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    Ok(summary)
}

async fn analyze_file(
    orchestrator: &Orchestrator,
    path: &Path,
) -> anyhow::Result<AnalysisResponse> {
    let code = std::fs::read_to_string(path)?;

    // The extension decides the language; unknown extensions never get
    // here, but auto-detection is a safe net.
    let language = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(Language::from_extension)
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| "auto".to_string());

    let request = AnalysisRequest::new(code, language);
    Ok(orchestrator.analyze(&request).await?)
}

fn build_exclude_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!(pattern = %pattern, error = %e, "ignoring invalid exclude pattern"),
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Collect recognized code files, skipping hidden and dependency
/// directories plus anything matching the exclude globs.
fn collect_files(root: &Path, exclude: &GlobSet) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            if e.file_type().is_dir() && name.starts_with('.') && e.depth() > 0 {
                return false;
            }
            if e.file_type().is_dir() && SKIPPED_DIRS.contains(&name.as_ref()) {
                return false;
            }
            true
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if Language::from_extension(ext).is_none() {
            continue;
        }
        if exclude.is_match(path) {
            continue;
        }

        files.push(path.to_path_buf());
    }

    Ok(files)
}
