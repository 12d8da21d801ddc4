//! Text (terminal) reporter with colors and formatting

use crate::models::{AnalysisReport, Finding, Severity};
use crate::reporters::RenderOptions;
use anyhow::Result;

/// Grade colors (ANSI escape codes)
fn grade_color(grade: &str) -> &'static str {
    match grade {
        "A" => "\x1b[32m", // Green
        "B" => "\x1b[92m", // Light green
        "C" => "\x1b[33m", // Yellow
        "D" => "\x1b[91m", // Light red
        "F" => "\x1b[31m", // Red
        _ => "\x1b[0m",
    }
}

/// Severity colors
fn severity_color(severity: &Severity) -> &'static str {
    match severity {
        Severity::High => "\x1b[91m",    // Light red
        Severity::Warning => "\x1b[33m", // Yellow
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Severity tag
fn severity_tag(severity: &Severity) -> &'static str {
    match severity {
        Severity::High => "[H]",
        Severity::Warning => "[W]",
    }
}

/// Render report as formatted terminal output
pub fn render(report: &AnalysisReport, options: RenderOptions) -> Result<String> {
    let mut out = String::new();

    // Header
    let grade_c = grade_color(&report.grade);
    let strained = if options.no_emoji { "" } else { "\u{1f9f5} " };
    out.push_str(&format!("\n{BOLD}{strained}Linestrain Analysis{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Score: {BOLD}{:.1}/100{RESET}  Grade: {grade_c}{BOLD}{}{RESET}  ",
        report.overall_score, report.grade
    ));
    out.push_str(&format!(
        "Files: {}  Lines: {}\n\n",
        report.total_files, report.total_lines
    ));

    // Findings summary
    let fs = &report.findings_summary;
    out.push_str(&format!("{BOLD}FINDINGS{RESET} ({} total)\n", fs.total));

    let mut summary_parts = Vec::new();
    if fs.high > 0 {
        summary_parts.push(format!("\x1b[91m{} high{RESET}", fs.high));
    }
    if fs.warning > 0 {
        summary_parts.push(format!("\x1b[33m{} warning{RESET}", fs.warning));
    }
    if !summary_parts.is_empty() {
        out.push_str(&format!("  {}\n\n", summary_parts.join(" | ")));
    }

    // Top findings as table, High first, score descending within
    let mut findings: Vec<&Finding> = report.all_findings();
    findings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal))
    });

    let shown = if options.top == 0 {
        findings.len()
    } else {
        options.top
    };

    if !findings.is_empty() {
        out.push_str(&format!(
            "{DIM}  #   SEV   SCORE  FLAGS                                    FILE{RESET}\n"
        ));
        out.push_str(&format!(
            "{DIM}  ─────────────────────────────────────────────────────────────────{RESET}\n"
        ));

        for (i, finding) in findings.iter().take(shown).enumerate() {
            let sev_c = severity_color(&finding.severity);
            let sev_tag = severity_tag(&finding.severity);

            // Truncate long flag lists; take chars, not bytes
            let flags = finding.flag_list();
            let flags = if flags.chars().count() > 38 {
                format!("{}...", flags.chars().take(35).collect::<String>())
            } else {
                flags
            };

            out.push_str(&format!(
                "  {DIM}{:>3}{RESET}  {sev_c}{}{RESET}  {:>5.2}  {:<40}  {DIM}{}{RESET}\n",
                i + 1,
                sev_tag,
                finding.score,
                flags,
                format_file_location(finding)
            ));
        }

        let remaining = findings.len().saturating_sub(shown);
        if remaining > 0 {
            out.push_str(&format!(
                "\n  {DIM}...and {} more (use --top 0 to show all){RESET}\n",
                remaining
            ));
        }
        out.push('\n');

        // Full message for the top finding so the remediation text is
        // one screen away
        if let Some(top) = findings.first() {
            out.push_str(&format!("{BOLD}TOP FINDING{RESET}\n"));
            out.push_str(&format!("  {}\n\n", top.message));
        }
    }

    // Tips based on grade
    match report.grade.as_str() {
        "A" => out.push_str(&format!("{DIM}Clean prose. Keep it this way.{RESET}\n")),
        "B" => out.push_str(&format!(
            "{DIM}Mostly clean. Address remaining lines for an A.{RESET}\n"
        )),
        "C" | "D" | "F" => {
            out.push_str(&format!(
                "{DIM}Run `linestrain analyze --format markdown -o report.md` for a reviewable report.{RESET}\n"
            ));
        }
        _ => {}
    }

    Ok(out)
}

fn format_file_location(finding: &Finding) -> String {
    let Some(file) = finding.file.as_ref() else {
        return format!("line {}", finding.line + 1);
    };
    let file_str = file.display().to_string();
    let short_file = if file_str.chars().count() > 25 {
        let skip = file_str.chars().count() - 22;
        format!("...{}", file_str.chars().skip(skip).collect::<String>())
    } else {
        file_str
    };
    format!("{}:{}", short_file, finding.line + 1)
}
