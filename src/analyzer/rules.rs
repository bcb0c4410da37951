//! Rule tables for the static analyzer.
//!
//! Every check is data plus a matcher: adding a rule means adding a table
//! entry, not a new code path. Severities are fixed per rule, never
//! computed.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::language::Language;
use crate::result::{BestPractice, Improvement, Severity};

/// Line count above which decomposition is suggested.
const LONG_FILE_LINES: usize = 50;
/// Minimum comment density before more documentation is suggested.
const MIN_COMMENT_RATIO: f64 = 0.1;

static RANGE_LEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"range\(len\(").expect("invalid rule pattern"));

static HARDCODED_PASSWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)password\s*=\s*["']"#).expect("invalid rule pattern"));

static MAGIC_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{2,}\b").expect("invalid rule pattern"));

static PYTHON_DOCSTRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"def \w+\(.*\):\s*""""#).expect("invalid rule pattern"));

/// A per-line bug check.
///
/// The matcher sees the current line and the one after it (for rules like
/// bare-except-then-pass); the last line sees itself as its successor.
pub struct BugRule {
    pub severity: Severity,
    pub issue: &'static str,
    pub fix: &'static str,
    pub matches: fn(line: &str, next: &str) -> bool,
}

/// A per-line security check.
pub struct SecurityRule {
    pub severity: Severity,
    pub risk: &'static str,
    pub mitigation: &'static str,
    pub matches: fn(line: &str) -> bool,
}

static PYTHON_BUG_RULES: &[BugRule] = &[
    BugRule {
        severity: Severity::Medium,
        issue: "Use \"is None\" instead of \"== None\"",
        fix: "Replace \"== None\" with \"is None\" for identity comparison",
        matches: |line, _| line.contains("==") && line.contains("if") && line.contains("None"),
    },
    BugRule {
        severity: Severity::High,
        issue: "Bare except clause catches all exceptions",
        fix: "Specify exception types: except ValueError, TypeError:",
        matches: |line, next| line.contains("except:") && next.contains("pass"),
    },
    BugRule {
        severity: Severity::Low,
        issue: "Unnecessary use of range(len())",
        fix: "Use \"for item in list:\" or \"for i, item in enumerate(list):\"",
        matches: |line, _| RANGE_LEN.is_match(line),
    },
    BugRule {
        severity: Severity::Low,
        issue: "Print statement found",
        fix: "Use logging module or remove for production",
        matches: |line, _| line.contains("print("),
    },
    BugRule {
        severity: Severity::Medium,
        issue: "File opened without context manager",
        fix: "Use \"with open(...) as f:\" to ensure file closure",
        matches: |line, _| line.contains("open(") && !line.contains("with"),
    },
];

static JAVASCRIPT_BUG_RULES: &[BugRule] = &[
    BugRule {
        severity: Severity::Medium,
        issue: "Use === instead of == for strict equality",
        fix: "Replace == with === to avoid type coercion",
        matches: |line, _| {
            line.contains("==") && !line.contains("===") && !line.contains("!=")
        },
    },
    BugRule {
        severity: Severity::Low,
        issue: "Use let or const instead of var",
        fix: "Replace var with const (immutable) or let (mutable)",
        matches: |line, _| line.contains("var "),
    },
    BugRule {
        severity: Severity::Low,
        issue: "Console log found",
        fix: "Remove console.log statements from production code",
        matches: |line, _| line.contains("console.log("),
    },
];

static PYTHON_SECURITY_RULES: &[SecurityRule] = &[
    SecurityRule {
        severity: Severity::High,
        risk: "Code injection vulnerability with eval()",
        mitigation: "Avoid eval(). Use ast.literal_eval() for safe evaluation",
        matches: |line| line.contains("eval("),
    },
    SecurityRule {
        severity: Severity::High,
        risk: "Pickle deserialization can execute arbitrary code",
        mitigation: "Use JSON or validate pickle sources carefully",
        matches: |line| line.contains("pickle.load"),
    },
    SecurityRule {
        severity: Severity::High,
        risk: "Hardcoded password detected",
        mitigation: "Use environment variables or secure vaults",
        matches: |line| HARDCODED_PASSWORD.is_match(line),
    },
    SecurityRule {
        severity: Severity::High,
        risk: "Shell injection risk with shell=True",
        mitigation: "Set shell=False (default) or sanitize input carefully",
        matches: |line| {
            (line.contains("subprocess.call") || line.contains("subprocess.Popen"))
                && line.contains("shell=True")
        },
    },
];

static JAVASCRIPT_SECURITY_RULES: &[SecurityRule] = &[
    SecurityRule {
        severity: Severity::High,
        risk: "eval() can execute malicious code",
        mitigation: "Avoid eval(). Use JSON.parse() or safer alternatives",
        matches: |line| line.contains("eval("),
    },
    SecurityRule {
        severity: Severity::High,
        risk: "XSS vulnerability with innerHTML",
        mitigation: "Use textContent or sanitize input with DOMPurify",
        matches: |line| line.contains("innerHTML") && line.contains('+'),
    },
];

/// Bug rules for a language. Languages without a table yet get none.
pub fn bug_rules(language: Language) -> &'static [BugRule] {
    match language {
        Language::Python => PYTHON_BUG_RULES,
        Language::Javascript => JAVASCRIPT_BUG_RULES,
        _ => &[],
    }
}

/// Security rules for a language.
pub fn security_rules(language: Language) -> &'static [SecurityRule] {
    match language {
        Language::Python => PYTHON_SECURITY_RULES,
        Language::Javascript => JAVASCRIPT_SECURITY_RULES,
        _ => &[],
    }
}

/// Whole-file improvement heuristics, language-independent.
pub fn suggest_improvements(code: &str) -> Vec<Improvement> {
    let mut improvements = Vec::new();
    let lines: Vec<&str> = code.lines().collect();

    if lines.len() > LONG_FILE_LINES {
        improvements.push(Improvement {
            category: "maintainability".to_string(),
            suggestion: "Consider breaking down into smaller functions".to_string(),
            example: "Split large functions into focused, single-purpose functions".to_string(),
        });
    }

    let comment_count = lines
        .iter()
        .filter(|l| {
            let trimmed = l.trim_start();
            trimmed.starts_with('#') || trimmed.starts_with("//")
        })
        .count();
    if (comment_count as f64) < lines.len() as f64 * MIN_COMMENT_RATIO {
        improvements.push(Improvement {
            category: "readability".to_string(),
            suggestion: "Add more comments to explain complex logic".to_string(),
            example: "# Explain what this section does".to_string(),
        });
    }

    if MAGIC_NUMBER.is_match(code) {
        improvements.push(Improvement {
            category: "maintainability".to_string(),
            suggestion: "Replace magic numbers with named constants".to_string(),
            example: "MAX_RETRIES = 3 instead of hardcoded 3".to_string(),
        });
    }

    improvements
}

/// Language-specific best-practice checks over the whole file.
pub fn check_best_practices(code: &str, language: Language) -> Vec<BestPractice> {
    let mut practices = Vec::new();

    match language {
        Language::Python => {
            if code.contains("import *") {
                practices.push(BestPractice {
                    practice: "Avoid wildcard imports".to_string(),
                    current: "from module import *".to_string(),
                    recommended: "from module import specific_function".to_string(),
                });
            }

            if !PYTHON_DOCSTRING.is_match(code) {
                practices.push(BestPractice {
                    practice: "Add docstrings to functions".to_string(),
                    current: "Functions without documentation".to_string(),
                    recommended: "Add \"\"\"docstring\"\"\" after function definition".to_string(),
                });
            }
        }
        Language::Javascript => {
            if code.contains("function(") && !code.contains("=>") {
                practices.push(BestPractice {
                    practice: "Consider using arrow functions".to_string(),
                    current: "function(x) { return x * 2; }".to_string(),
                    recommended: "(x) => x * 2".to_string(),
                });
            }
        }
        _ => {}
    }

    practices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_bug_tables_match() {
        let rules = bug_rules(Language::Python);
        assert!(rules
            .iter()
            .any(|r| (r.matches)("if x == None:", "")));
        assert!(rules.iter().any(|r| (r.matches)("except:", "    pass")));
        assert!(rules
            .iter()
            .any(|r| (r.matches)("for i in range(len(items)):", "")));
        assert!(rules
            .iter()
            .any(|r| (r.matches)("f = open('data.txt')", "")));
    }

    #[test]
    fn test_open_with_context_manager_is_clean() {
        let rules = bug_rules(Language::Python);
        let line = "with open('data.txt') as f:";
        assert!(!rules
            .iter()
            .any(|r| r.issue.contains("context manager") && (r.matches)(line, "")));
    }

    #[test]
    fn test_javascript_loose_equality() {
        let rules = bug_rules(Language::Javascript);
        let loose = rules
            .iter()
            .find(|r| r.issue.contains("strict equality"))
            .unwrap();
        assert!((loose.matches)("if (a == b) {", ""));
        assert!(!(loose.matches)("if (a === b) {", ""));
        assert!(!(loose.matches)("if (a !== b) {", ""));
    }

    #[test]
    fn test_python_security_tables_match() {
        let rules = security_rules(Language::Python);
        assert!(rules.iter().any(|r| (r.matches)("eval(user_input)")));
        assert!(rules.iter().any(|r| (r.matches)("data = pickle.load(f)")));
        assert!(rules
            .iter()
            .any(|r| (r.matches)("PASSWORD = \"hunter2\"")));
        assert!(rules
            .iter()
            .any(|r| (r.matches)("subprocess.call(cmd, shell=True)")));
        assert!(!rules
            .iter()
            .any(|r| (r.matches)("subprocess.call([\"ls\", \"-l\"])")));
    }

    #[test]
    fn test_unknown_language_has_no_rules() {
        assert!(bug_rules(Language::Sql).is_empty());
        assert!(security_rules(Language::Css).is_empty());
    }

    #[test]
    fn test_improvements_for_uncommented_long_file() {
        let code = (0..60)
            .map(|i| format!("x{} = {}", i, i))
            .collect::<Vec<_>>()
            .join("\n");
        let improvements = suggest_improvements(&code);
        assert!(improvements.iter().any(|i| i.suggestion.contains("smaller")));
        assert!(improvements.iter().any(|i| i.suggestion.contains("comments")));
        // Two-digit literals appear from x10 onwards.
        assert!(improvements
            .iter()
            .any(|i| i.suggestion.contains("magic numbers")));
    }

    #[test]
    fn test_wildcard_import_flagged() {
        let practices = check_best_practices("from os import *", Language::Python);
        assert!(practices.iter().any(|p| p.practice.contains("wildcard")));
    }

    #[test]
    fn test_docstring_present_not_flagged() {
        let code = "def add(a, b):\n    \"\"\"Add two numbers.\"\"\"\n    return a + b";
        let practices = check_best_practices(code, Language::Python);
        assert!(!practices.iter().any(|p| p.practice.contains("docstrings")));
    }
}
