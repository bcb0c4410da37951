//! Core types for analysis results.
//!
//! Everything in here is a request-scoped value object: findings, metric
//! scores, per-analyzer results, and the assembled response. Scores carry
//! their range invariant (1-10) at construction time and serialize in the
//! wire format `"N/10"` expected by consumers.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Severity levels for bug and security findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Medium
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// A metric score in the closed range [1, 10].
///
/// Serializes as `"N/10"`. Deserialization is deliberately lenient because
/// generative model output mixes integers, floats, and pre-formatted
/// strings; everything is coerced to an integer and clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score(u8);

impl Score {
    /// Clamp any integer into the valid score range.
    pub fn new(value: i64) -> Self {
        Self(value.clamp(1, 10) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Score {
    fn default() -> Self {
        Score(7)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/10", self.0)
    }
}

/// Parse a score from a string like `"8"`, `"8/10"`, or `"8.4"`.
fn parse_score_str(s: &str) -> Option<i64> {
    let s = s.trim();
    let s = s.strip_suffix("/10").unwrap_or(s).trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    s.parse::<f64>().ok().map(|f| f as i64)
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreVisitor;

        impl<'de> Visitor<'de> for ScoreVisitor {
            type Value = Score;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a score between 1 and 10, optionally formatted \"N/10\"")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Score, E> {
                Ok(Score::new(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Score, E> {
                Ok(Score::new(v.min(i64::MAX as u64) as i64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Score, E> {
                Ok(Score::new(v as i64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Score, E> {
                parse_score_str(v)
                    .map(Score::new)
                    .ok_or_else(|| E::custom(format!("invalid score: {:?}", v)))
            }
        }

        deserializer.deserialize_any(ScoreVisitor)
    }
}

/// An overall quality score in [1, 10] with one-decimal precision.
///
/// Formats as `"8/10"` for whole values and `"7.5/10"` otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityScore(f32);

impl QualityScore {
    /// Clamp into [1, 10] and round to one decimal place.
    pub fn new(value: f64) -> Self {
        let clamped = value.clamp(1.0, 10.0);
        Self(((clamped * 10.0).round() / 10.0) as f32)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Parse from a string like `"8/10"`, `"7.5"`, or `"9"`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_suffix("/10").unwrap_or(s).trim();
        s.parse::<f64>().ok().map(QualityScore::new)
    }
}

impl Default for QualityScore {
    fn default() -> Self {
        QualityScore(7.0)
    }
}

impl fmt::Display for QualityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract().abs() < f32::EPSILON {
            write!(f, "{}/10", self.0 as i32)
        } else {
            write!(f, "{:.1}/10", self.0)
        }
    }
}

impl Serialize for QualityScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QualityScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QualityVisitor;

        impl<'de> Visitor<'de> for QualityVisitor {
            type Value = QualityScore;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a quality score between 1 and 10, optionally formatted \"N/10\"")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<QualityScore, E> {
                Ok(QualityScore::new(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<QualityScore, E> {
                Ok(QualityScore::new(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<QualityScore, E> {
                Ok(QualityScore::new(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<QualityScore, E> {
                QualityScore::parse(v)
                    .ok_or_else(|| E::custom(format!("invalid quality score: {:?}", v)))
            }
        }

        deserializer.deserialize_any(QualityVisitor)
    }
}

/// A potential bug found on a specific line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugFinding {
    #[serde(default)]
    pub severity: Severity,
    /// Line number or range, as text. Static analysis reports exact 1-based
    /// numbers; generative analysis may report advisory text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub fix: String,
}

/// A security risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityFinding {
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    #[serde(default)]
    pub mitigation: String,
}

/// A suggested improvement (no severity; carries a category instead).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub example: String,
}

/// A best-practice deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPractice {
    #[serde(default)]
    pub practice: String,
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub recommended: String,
}

/// Any finding, tagged by kind. Used where a single heterogeneous list is
/// more convenient than the four per-kind lists of [`AnalysisResult`].
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    Bug(BugFinding),
    Security(SecurityFinding),
    Improvement(Improvement),
    BestPractice(BestPractice),
}

impl Finding {
    /// Severity, for the kinds that carry one.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Finding::Bug(b) => Some(b.severity),
            Finding::Security(s) => Some(s.severity),
            Finding::Improvement(_) | Finding::BestPractice(_) => None,
        }
    }

    /// The primary human-readable description.
    pub fn description(&self) -> &str {
        match self {
            Finding::Bug(b) => &b.issue,
            Finding::Security(s) => &s.risk,
            Finding::Improvement(i) => &i.suggestion,
            Finding::BestPractice(p) => &p.practice,
        }
    }

    /// The suggested remediation text.
    pub fn remediation(&self) -> &str {
        match self {
            Finding::Bug(b) => &b.fix,
            Finding::Security(s) => &s.mitigation,
            Finding::Improvement(i) => &i.example,
            Finding::BestPractice(p) => &p.recommended,
        }
    }
}

/// Named metric scores, each in [1, 10].
///
/// `extra` captures analyzer-specific extensions beyond the three core
/// metrics; it is flattened on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSet {
    #[serde(default)]
    pub complexity: Score,
    #[serde(default)]
    pub readability: Score,
    #[serde(default)]
    pub maintainability: Score,
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Score>,
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// The result of one analyzer pass (static or generative).
///
/// When `is_fallback` is true the findings and metrics are verbatim copies
/// of the static analyzer's result for the same request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_quality: QualityScore,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub bugs: Vec<BugFinding>,
    #[serde(default)]
    pub improvements: Vec<Improvement>,
    #[serde(default)]
    pub best_practices: Vec<BestPractice>,
    #[serde(default)]
    pub security: Vec<SecurityFinding>,
    #[serde(default)]
    pub metrics: MetricsSet,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_fallback: bool,
}

impl AnalysisResult {
    /// All findings as a single tagged list, in kind order.
    pub fn findings(&self) -> Vec<Finding> {
        let mut out = Vec::with_capacity(
            self.bugs.len() + self.security.len() + self.improvements.len()
                + self.best_practices.len(),
        );
        out.extend(self.bugs.iter().cloned().map(Finding::Bug));
        out.extend(self.security.iter().cloned().map(Finding::Security));
        out.extend(self.improvements.iter().cloned().map(Finding::Improvement));
        out.extend(self.best_practices.iter().cloned().map(Finding::BestPractice));
        out
    }

    pub fn has_findings(&self) -> bool {
        !self.bugs.is_empty()
            || !self.security.is_empty()
            || !self.improvements.is_empty()
            || !self.best_practices.is_empty()
    }
}

/// The assembled response for one analysis request.
///
/// Constructed once by the orchestrator and never mutated afterwards; the
/// cached copy is re-stamped (`cached`, `analysis_time`) on the way out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Human-readable name of the resolved language.
    pub detected_language: String,
    pub static_analysis: AnalysisResult,
    pub ai_analysis: AnalysisResult,
    /// True when `ai_analysis` is a fallback copy of the static result.
    pub ai_fallback: bool,
    pub cached: bool,
    /// Elapsed wall-clock time, e.g. `"0.42s"` or `"0.00s (cached)"`.
    pub analysis_time: String,
}
