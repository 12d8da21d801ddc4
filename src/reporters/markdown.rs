//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for:
//! - Pull request comments
//! - CI job summaries
//! - Documentation review threads

use crate::engine::compose::flag_info;
use crate::models::{AnalysisReport, Finding, Severity};
use crate::reporters::RenderOptions;
use anyhow::Result;
use chrono::Local;

/// Render report as GitHub-flavored Markdown
pub fn render(report: &AnalysisReport, options: RenderOptions) -> Result<String> {
    let mut md = String::new();

    md.push_str(&render_header(report, options));
    md.push('\n');

    md.push_str(&render_summary(report));
    md.push('\n');

    md.push_str(&render_detailed_findings(report, options));
    md.push('\n');

    md.push_str(&render_footer());

    Ok(md)
}

fn render_header(report: &AnalysisReport, options: RenderOptions) -> String {
    let grade_emoji = if options.no_emoji {
        ""
    } else {
        match report.grade.as_str() {
            "A" => "🏆 ",
            "B" => "⭐ ",
            "C" => "⚠️ ",
            "D" => "❌ ",
            _ => "💀 ",
        }
    };

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    format!(
        r#"# {}Linestrain Prose Report

**Grade: {}** | **Score: {:.1}/100**

Generated: {}
"#,
        grade_emoji, report.grade, report.overall_score, timestamp
    )
}

fn render_summary(report: &AnalysisReport) -> String {
    let assessment = match report.grade.as_str() {
        "A" => "Clean - Prose reads naturally",
        "B" => "Good - A few strained lines worth a look",
        "C" => "Fair - Several lines read as generated filler",
        "D" => "Poor - Substantial strained content",
        "F" => "Critical - The document is dominated by strained lines",
        _ => "",
    };

    format!(
        r#"## Summary

| Metric | Value |
|--------|-------|
| **Overall Grade** | {} |
| **Overall Score** | {:.1}/100 |
| **Files Scanned** | {} |
| **Lines Scanned** | {} |
| **High Findings** | {} |
| **Warnings** | {} |
| **Assessment** | {} |
"#,
        report.grade,
        report.overall_score,
        report.total_files,
        report.total_lines,
        report.findings_summary.high,
        report.findings_summary.warning,
        assessment
    )
}

fn render_detailed_findings(report: &AnalysisReport, options: RenderOptions) -> String {
    let mut md = String::from("## Findings\n\n");

    let all = report.all_findings();
    if all.is_empty() {
        md.push_str("No strained lines found.\n");
        return md;
    }

    let per_severity = if options.top == 0 { usize::MAX } else { options.top };

    for severity in [Severity::High, Severity::Warning] {
        let findings: Vec<&&Finding> = all.iter().filter(|f| f.severity == severity).collect();
        if findings.is_empty() {
            continue;
        }

        md.push_str(&format!(
            "### {} ({})\n\n",
            capitalize(&severity.to_string()),
            findings.len()
        ));

        let hidden = findings.len().saturating_sub(per_severity);
        for finding in findings.iter().take(per_severity) {
            md.push_str(&render_finding(finding));
        }
        if hidden > 0 {
            md.push_str(&format!("*...and {} more {} findings*\n\n", hidden, severity));
        }
    }

    md
}

fn render_finding(finding: &Finding) -> String {
    let mut md = String::new();

    let location = match finding.file.as_ref() {
        Some(file) => format!("`{}:{}`", file.display(), finding.line + 1),
        None => format!("line {}", finding.line + 1),
    };
    md.push_str(&format!(
        "#### {} at {} (score {:.2})\n\n",
        finding.flag_list(),
        location,
        finding.score
    ));

    for &flag in &finding.flags {
        let info = flag_info(flag);
        md.push_str(&format!(
            "- **{}**: {}\n  > Fix: {}\n",
            flag.name(),
            info.explanation,
            info.remediation
        ));
    }
    md.push('\n');

    md
}

fn render_footer() -> String {
    r#"---

*Generated by [linestrain](https://github.com/linestrain/linestrain) - per-line prose strain analysis*
"#
    .to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
