//! Rule-based static analysis.
//!
//! Runs the per-language rule tables over a code sample, computes metrics,
//! and derives a deduction-based overall score. Total for well-formed
//! input: a rule that does not match simply contributes no finding.

pub mod metrics;
pub mod rules;

use tracing::debug;

use crate::language::Language;
use crate::result::{
    AnalysisResult, BugFinding, QualityScore, SecurityFinding, Severity,
};

/// The deterministic analyzer. Stateless; construct once and share.
#[derive(Debug, Default)]
pub struct StaticAnalyzer;

impl StaticAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a sanitized code sample in the given language.
    pub fn analyze(&self, code: &str, language: Language) -> AnalysisResult {
        let bugs = self.detect_bugs(code, language);
        let security = self.detect_security(code, language);
        let improvements = rules::suggest_improvements(code);
        let best_practices = rules::check_best_practices(code, language);
        let metrics = metrics::calculate(code);

        let overall_quality = quality_score(&bugs, &security);
        let summary = summarize(overall_quality, bugs.len(), security.len());

        debug!(
            language = %language,
            bugs = bugs.len(),
            security = security.len(),
            score = %overall_quality,
            "static analysis complete"
        );

        AnalysisResult {
            overall_quality,
            summary,
            bugs,
            improvements,
            best_practices,
            security,
            metrics,
            is_fallback: false,
        }
    }

    fn detect_bugs(&self, code: &str, language: Language) -> Vec<BugFinding> {
        let lines: Vec<&str> = code.lines().collect();
        let mut findings = Vec::new();

        for (idx, &line) in lines.iter().enumerate() {
            // The last line acts as its own successor.
            let next = lines.get(idx + 1).copied().unwrap_or(line);

            for rule in rules::bug_rules(language) {
                if (rule.matches)(line, next) {
                    findings.push(BugFinding {
                        severity: rule.severity,
                        line: Some((idx + 1).to_string()),
                        issue: rule.issue.to_string(),
                        fix: rule.fix.to_string(),
                    });
                }
            }
        }

        findings
    }

    fn detect_security(&self, code: &str, language: Language) -> Vec<SecurityFinding> {
        let mut findings = Vec::new();

        for (idx, line) in code.lines().enumerate() {
            for rule in rules::security_rules(language) {
                if (rule.matches)(line) {
                    findings.push(SecurityFinding {
                        risk: rule.risk.to_string(),
                        severity: rule.severity,
                        line: Some((idx + 1).to_string()),
                        mitigation: rule.mitigation.to_string(),
                    });
                }
            }
        }

        findings
    }
}

/// Additive-deduction scoring: start at 10, subtract per finding by
/// severity, clamp to [1, 10]. More or worse findings can never raise the
/// score.
pub fn quality_score(bugs: &[BugFinding], security: &[SecurityFinding]) -> QualityScore {
    let mut score = 10.0;

    for bug in bugs {
        score -= match bug.severity {
            Severity::High | Severity::Critical => 2.0,
            Severity::Medium => 1.0,
            Severity::Low => 0.5,
        };
    }

    for finding in security {
        score -= match finding.severity {
            Severity::High | Severity::Critical => 2.0,
            Severity::Medium => 1.0,
            Severity::Low => 0.0,
        };
    }

    QualityScore::new(score)
}

/// Templated summary: a quality band with tone marker, then counts.
fn summarize(score: QualityScore, bug_count: usize, security_count: usize) -> String {
    let value = score.value();
    let (quality, emoji) = if value >= 8.0 {
        ("excellent", "🌟")
    } else if value >= 6.0 {
        ("good", "✅")
    } else if value >= 4.0 {
        ("fair", "⚠️")
    } else {
        ("needs improvement", "🔧")
    };

    let mut summary = format!(
        "{} Code quality is {} with a score of {}.\n\n",
        emoji, quality, score
    );

    if bug_count > 0 {
        summary.push_str(&format!("🐛 Found {} potential bug(s).\n", bug_count));
    }
    if security_count > 0 {
        summary.push_str(&format!(
            "🔒 Detected {} security concern(s).\n",
            security_count
        ));
    }
    if bug_count == 0 && security_count == 0 {
        summary.push_str("✨ No critical issues detected. Great job!\n");
    }

    if value < 8.0 {
        summary.push_str(
            "\n💡 Recommendations: Review the suggestions below to improve code quality.",
        );
    }

    summary.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_function_scores_high() {
        let analyzer = StaticAnalyzer::new();
        let result = analyzer.analyze("def add(a, b): return a + b", Language::Python);

        assert!(result.bugs.is_empty());
        assert!(result.security.is_empty());
        assert!(result.overall_quality.value() >= 7.0);
        assert!(result.summary.contains("excellent"));
        assert!(!result.is_fallback);
    }

    #[test]
    fn test_eval_produces_exactly_one_high_security_finding() {
        let analyzer = StaticAnalyzer::new();
        let code = "def run(user_input):\n    return eval(user_input)";
        let result = analyzer.analyze(code, Language::Python);

        assert_eq!(result.security.len(), 1);
        let finding = &result.security[0];
        assert_eq!(finding.severity, Severity::High);
        assert!(finding.risk.contains("injection"));
        assert!(finding.risk.contains("eval("));
        assert_eq!(finding.line.as_deref(), Some("2"));
    }

    #[test]
    fn test_bug_lines_are_one_based() {
        let analyzer = StaticAnalyzer::new();
        let code = "x = 1\nprint(x)";
        let result = analyzer.analyze(code, Language::Python);

        let print_bug = result
            .bugs
            .iter()
            .find(|b| b.issue.contains("Print"))
            .unwrap();
        assert_eq!(print_bug.line.as_deref(), Some("2"));
    }

    #[test]
    fn test_bare_except_then_pass() {
        let analyzer = StaticAnalyzer::new();
        let code = "try:\n    work()\nexcept:\n    pass";
        let result = analyzer.analyze(code, Language::Python);

        assert!(result
            .bugs
            .iter()
            .any(|b| b.severity == Severity::High && b.issue.contains("Bare except")));
    }

    #[test]
    fn test_javascript_rules_apply() {
        let analyzer = StaticAnalyzer::new();
        let code = "var x = 5;\nif (x == 5) {\n    console.log(x);\n}";
        let result = analyzer.analyze(code, Language::Javascript);

        assert!(result.bugs.iter().any(|b| b.issue.contains("===")));
        assert!(result.bugs.iter().any(|b| b.issue.contains("var")));
        assert!(result.bugs.iter().any(|b| b.issue.contains("Console")));
    }

    #[test]
    fn test_score_monotone_in_findings() {
        let high_bug = BugFinding {
            severity: Severity::High,
            line: None,
            issue: String::new(),
            fix: String::new(),
        };
        let low_bug = BugFinding {
            severity: Severity::Low,
            ..high_bug.clone()
        };

        let mut bugs = Vec::new();
        let mut previous = quality_score(&bugs, &[]).value();
        for extra in [high_bug.clone(), low_bug.clone(), high_bug, low_bug] {
            bugs.push(extra);
            let current = quality_score(&bugs, &[]).value();
            assert!(current <= previous);
            previous = current;
        }
    }

    #[test]
    fn test_score_clamped_to_floor() {
        let bugs: Vec<BugFinding> = (0..10)
            .map(|_| BugFinding {
                severity: Severity::High,
                line: None,
                issue: String::new(),
                fix: String::new(),
            })
            .collect();
        assert_eq!(quality_score(&bugs, &[]).value(), 1.0);
    }

    #[test]
    fn test_half_point_deductions_keep_one_decimal() {
        let bugs = vec![BugFinding {
            severity: Severity::Low,
            line: None,
            issue: String::new(),
            fix: String::new(),
        }];
        assert_eq!(quality_score(&bugs, &[]).to_string(), "9.5/10");
    }

    #[test]
    fn test_summary_bands() {
        assert!(summarize(QualityScore::new(9.0), 0, 0).contains("excellent"));
        assert!(summarize(QualityScore::new(6.5), 1, 0).contains("good"));
        assert!(summarize(QualityScore::new(4.5), 2, 1).contains("fair"));
        assert!(summarize(QualityScore::new(2.0), 5, 2).contains("needs improvement"));
    }

    #[test]
    fn test_summary_counts_and_all_clear() {
        let with_findings = summarize(QualityScore::new(5.0), 2, 1);
        assert!(with_findings.contains("2 potential bug(s)"));
        assert!(with_findings.contains("1 security concern(s)"));

        let clean = summarize(QualityScore::new(10.0), 0, 0);
        assert!(clean.contains("No critical issues detected"));
    }
}
