//! Output formatting for analysis responses.
//!
//! Two formats: pretty (colored terminal output) and JSON (the response
//! serialized verbatim, which is also the shape an HTTP host would return).

use colored::*;

use crate::batch::BatchSummary;
use crate::result::{AnalysisResponse, AnalysisResult, Finding, Severity};

/// Write a response as pretty terminal output.
pub fn write_pretty(source: &str, response: &AnalysisResponse) {
    println!();
    print!("  ");
    print!("{}", "codecritic".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Source:   ".dimmed());
    println!("{}", source);
    print!("  {}", "Language: ".dimmed());
    println!("{}", response.detected_language);
    print!("  {}", "Elapsed:  ".dimmed());
    println!("{}", response.analysis_time);
    println!();

    write_result_section("Static analysis", &response.static_analysis);

    let ai_title = if response.ai_fallback {
        "AI analysis (fallback)"
    } else {
        "AI analysis"
    };
    write_result_section(ai_title, &response.ai_analysis);
}

fn write_result_section(title: &str, result: &AnalysisResult) {
    print!("  {}", title.bold());
    print!("  ");
    write_colored_score(result);
    println!();

    for line in result.summary.lines() {
        println!("    {}", line);
    }
    println!();

    let findings = result.findings();
    if !findings.is_empty() {
        for finding in &findings {
            write_finding(finding);
        }
        println!();
    }

    println!(
        "    {} complexity {}  readability {}  maintainability {}",
        "metrics:".dimmed(),
        result.metrics.complexity,
        result.metrics.readability,
        result.metrics.maintainability
    );
    println!();
}

fn write_colored_score(result: &AnalysisResult) {
    let value = result.overall_quality.value();
    let text = result.overall_quality.to_string();
    if value >= 8.0 {
        print!("{}", text.green().bold());
    } else if value >= 6.0 {
        print!("{}", text.yellow().bold());
    } else {
        print!("{}", text.red().bold());
    }
}

fn write_finding(finding: &Finding) {
    let kind = match finding {
        Finding::Bug(_) => "bug",
        Finding::Security(_) => "security",
        Finding::Improvement(_) => "improvement",
        Finding::BestPractice(_) => "practice",
    };

    match finding.severity() {
        Some(severity) => {
            print!("    {} ", colored_severity(severity));
        }
        None => {
            print!("    {} ", "·".dimmed());
        }
    }
    print!("{} ", format!("[{}]", kind).dimmed());
    print!("{}", finding.description());

    let line = match finding {
        Finding::Bug(b) => b.line.as_deref(),
        Finding::Security(s) => s.line.as_deref(),
        _ => None,
    };
    if let Some(line) = line {
        print!("{}", format!(" (line {})", line).dimmed());
    }
    println!();

    if !finding.remediation().is_empty() {
        println!("        {}", finding.remediation().dimmed());
    }
}

fn colored_severity(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical | Severity::High => severity.to_string().red().bold(),
        Severity::Medium => severity.to_string().yellow(),
        Severity::Low => severity.to_string().normal(),
    }
}

/// Write a response as JSON to stdout.
pub fn write_json(response: &AnalysisResponse) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(response)?;
    println!("{}", json);
    Ok(())
}

/// Write a batch summary as pretty terminal output.
pub fn write_batch_pretty(root: &str, summary: &BatchSummary) {
    println!();
    print!("  ");
    print!("{}", "codecritic".cyan().bold());
    println!(" v{} (batch)", env!("CARGO_PKG_VERSION"));
    println!();
    print!("  {}", "Root: ".dimmed());
    println!("{}", root);
    println!();

    for report in &summary.reports {
        let score = report.response.static_analysis.overall_quality;
        let text = score.to_string();
        let colored_text = if score.value() >= 8.0 {
            text.green()
        } else if score.value() >= 6.0 {
            text.yellow()
        } else {
            text.red()
        };
        println!(
            "  {:<8} {:<12} {}",
            colored_text,
            report.response.detected_language,
            report.path.display()
        );
    }
    println!();

    println!(
        "  {} analyzed, {} skipped",
        summary.reports.len(),
        summary.skipped
    );
    if let Some(average) = summary.average_score() {
        println!("  average score: {:.1}/10", average);
    }
    for (language, count) in &summary.by_language {
        println!("    {:<12} {}", language, count);
    }
    println!();
}

/// Write a batch summary as JSON to stdout.
pub fn write_batch_json(summary: &BatchSummary) -> anyhow::Result<()> {
    let files: Vec<serde_json::Value> = summary
        .reports
        .iter()
        .map(|r| {
            serde_json::json!({
                "path": r.path.display().to_string(),
                "analysis": r.response,
            })
        })
        .collect();

    let json = serde_json::to_string_pretty(&serde_json::json!({
        "files": files,
        "analyzed": summary.reports.len(),
        "skipped": summary.skipped,
        "by_language": summary.by_language,
    }))?;
    println!("{}", json);
    Ok(())
}
