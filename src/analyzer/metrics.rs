//! Code metric calculations.
//!
//! All three metrics are coarse line-based estimates clamped to [1, 10];
//! higher is always better (complexity is inverted).

use crate::result::{MetricsSet, Score};
use std::collections::BTreeMap;

/// Branching and looping keywords counted toward complexity.
const COMPLEXITY_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "try", "except", "case", "switch",
];

/// Average line length considered ideal for readability.
const READABILITY_BASELINE: f64 = 40.0;

/// Compute the metric set for a code sample.
pub fn calculate(code: &str) -> MetricsSet {
    let lines: Vec<&str> = code.lines().collect();
    let non_empty: Vec<&str> = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .copied()
        .collect();

    MetricsSet {
        complexity: complexity(&lines),
        readability: readability(&non_empty),
        maintainability: maintainability(code, non_empty.len()),
        extra: BTreeMap::new(),
    }
}

/// Inverted cyclomatic estimate: each line scores one hit per branching
/// keyword it contains, and every two hits cost a point.
fn complexity(lines: &[&str]) -> Score {
    let hits: i64 = lines
        .iter()
        .map(|line| {
            COMPLEXITY_KEYWORDS
                .iter()
                .filter(|k| line.contains(*k))
                .count() as i64
        })
        .sum();
    Score::new(10 - hits / 2)
}

/// Distance of the average non-blank line length from the baseline.
fn readability(non_empty: &[&str]) -> Score {
    if non_empty.is_empty() {
        return Score::new(10);
    }
    let total: usize = non_empty.iter().map(|l| l.len()).sum();
    let avg = total as f64 / non_empty.len() as f64;
    Score::new((10.0 - (avg - READABILITY_BASELINE) / 10.0) as i64)
}

/// Average lines per function definition: many small functions score best.
fn maintainability(code: &str, non_empty_count: usize) -> Score {
    let functions = code.matches("def ").count() + code.matches("function ").count();
    let lines_per_function = non_empty_count as f64 / functions.max(1) as f64;

    let score = if lines_per_function < 20.0 {
        9
    } else if lines_per_function < 50.0 {
        7
    } else {
        5
    };
    Score::new(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_code_scores_high() {
        let metrics = calculate("def add(a, b):\n    return a + b");
        assert!(metrics.complexity.value() >= 9);
        assert!(metrics.readability.value() >= 9);
        assert_eq!(metrics.maintainability.value(), 9);
    }

    #[test]
    fn test_branch_heavy_code_scores_lower() {
        let branchy = (0..12)
            .map(|i| format!("if x > {}:\n    y = {}", i, i))
            .collect::<Vec<_>>()
            .join("\n");
        let metrics = calculate(&branchy);
        let simple = calculate("x = 1\ny = 2");
        assert!(metrics.complexity.value() < simple.complexity.value());
    }

    #[test]
    fn test_complexity_clamped_at_floor() {
        let very_branchy = "if else for while try except\n".repeat(30);
        let metrics = calculate(&very_branchy);
        assert_eq!(metrics.complexity.value(), 1);
    }

    #[test]
    fn test_long_lines_hurt_readability() {
        let long = format!("x = {}\n", "a".repeat(120)).repeat(5);
        let short = "x = 1\ny = 2\n";
        assert!(calculate(&long).readability.value() < calculate(short).readability.value());
    }

    #[test]
    fn test_maintainability_bands() {
        // One function, few lines: best band.
        let small = "def f():\n    return 1";
        assert_eq!(calculate(small).maintainability.value(), 9);

        // One function spanning many lines: middle band.
        let medium = format!("def f():\n{}", "    x = 1\n".repeat(30));
        assert_eq!(calculate(&medium).maintainability.value(), 7);

        // No functions at all, many lines: worst band.
        let flat = "x = 1\n".repeat(60);
        assert_eq!(calculate(&flat).maintainability.value(), 5);
    }
}
