//! Analyze command implementation
//!
//! This command performs a full prose scan:
//! 1. Load project config (linestrain.toml / .linestrainrc.json)
//! 2. Walk the tree and collect prose files
//! 3. Score every line with the strain engine
//! 4. Aggregate findings into a report with score and grade
//! 5. Output results (text, json, sarif, markdown)

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::warn;

use crate::analyzer::{analyze_file, walk_prose_files};
use crate::config::load_project_config;
use crate::engine::Engine;
use crate::models::{AnalysisReport, FileReport, Finding, FindingsSummary, Severity};
use crate::reporters::{self, OutputFormat, RenderOptions};

/// Run the analyze command
#[allow(clippy::too_many_arguments)]
pub fn run(
    path: &Path,
    format: Option<&str>,
    output: Option<&Path>,
    severity: Option<String>,
    top: Option<usize>,
    fail_on: Option<String>,
    no_emoji: bool,
    quiet: bool,
) -> Result<()> {
    let start_time = Instant::now();

    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    // Config sits next to the scanned file, or at the scanned root.
    let config_root = if path.is_file() {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    } else {
        path
    };
    let project_config = load_project_config(config_root);

    // Explicit CLI flags win; untouched ones fall back to config defaults.
    let format: OutputFormat = format
        .map(str::to_owned)
        .or_else(|| project_config.defaults.format.clone())
        .unwrap_or_else(|| "text".to_string())
        .parse()?;
    let severity = severity.or_else(|| project_config.defaults.severity.clone());
    let top = top.or(project_config.defaults.top).unwrap_or(20);
    let fail_on = fail_on.or_else(|| project_config.defaults.fail_on.clone());
    let no_emoji = no_emoji || project_config.defaults.no_emoji.unwrap_or(false);

    // Machine-readable formats suppress progress output
    let quiet_mode = quiet || matches!(format, OutputFormat::Json | OutputFormat::Sarif);

    print_header(path, no_emoji, quiet_mode);

    let engine = Engine::with_config(project_config.engine_config());

    // Phase 1: collect prose files
    let spinner = if quiet_mode {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(create_spinner_style());
    spinner.set_message("Collecting prose files...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let mut files: Vec<PathBuf> = if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        walk_prose_files(path)
            .filter(|p| !project_config.should_exclude(p))
            .collect()
    };
    files.sort();
    spinner.finish_and_clear();

    if files.is_empty() {
        if quiet_mode {
            // Machine formats still get a valid empty report
            let report = AnalysisReport::from_files(vec![]);
            let rendered =
                reporters::report_with_format(&report, format, RenderOptions { top, no_emoji })?;
            println!("{}", rendered);
        } else {
            println!(
                "\n{}No prose files found to analyze.",
                style(warn_icon(no_emoji)).yellow()
            );
        }
        return Ok(());
    }

    if !quiet_mode {
        println!(
            "{} Found {} prose files",
            style("✓").green(),
            style(files.len()).cyan()
        );
    }

    // Phase 2: score every line
    let bar = if quiet_mode {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(files.len() as u64)
    };
    bar.set_style(create_bar_style());
    bar.set_message("Scoring lines");

    let file_reports: Vec<FileReport> = files
        .par_iter()
        .filter_map(|file| {
            let report = match analyze_file(&engine, file) {
                Ok(r) => Some(r),
                Err(err) => {
                    warn!("skipping {}: {err:#}", file.display());
                    None
                }
            };
            bar.inc(1);
            report
        })
        .collect();
    bar.finish_and_clear();

    let report = AnalysisReport::from_files(file_reports);

    tracing::info!(
        "Scored {} lines across {} files: {} high, {} warning, score {:.1} ({})",
        report.total_lines,
        report.total_files,
        report.findings_summary.high,
        report.findings_summary.warning,
        report.overall_score,
        report.grade
    );

    // Machine formats carry the full finding set; --severity only
    // narrows what humans see.
    let display_report = match format {
        OutputFormat::Json | OutputFormat::Sarif => report.clone(),
        _ => apply_severity_filter(&report, severity.as_deref()),
    };

    let rendered =
        reporters::report_with_format(&display_report, format, RenderOptions { top, no_emoji })?;

    if let Some(out) = output {
        let out_path = resolve_output_path(out, format);
        std::fs::write(&out_path, &rendered)?;
        if !quiet_mode {
            println!(
                "\n{}Report written to: {}",
                style(if no_emoji { "" } else { "📄 " }).bold(),
                style(out_path.display()).cyan()
            );
        } else {
            println!("Report written to: {}", out_path.display());
        }
    } else {
        println!();
        println!("{}", rendered);
    }

    print_final_summary(quiet_mode, no_emoji, start_time);

    check_fail_threshold(&fail_on, &report)
}

/// Print analysis header
fn print_header(path: &Path, no_emoji: bool, quiet_mode: bool) {
    if quiet_mode {
        return;
    }
    let icon_search = if no_emoji { "" } else { "🔍 " };
    println!(
        "\n{}Scanning: {}",
        style(icon_search).bold(),
        style(path.display()).cyan()
    );
}

/// Print final summary message
fn print_final_summary(quiet_mode: bool, no_emoji: bool, start_time: Instant) {
    if !quiet_mode {
        let elapsed = start_time.elapsed();
        let icon_done = if no_emoji { "" } else { "✨ " };
        println!(
            "\n{}Analysis complete in {:.2}s",
            style(icon_done).bold(),
            elapsed.as_secs_f64()
        );
    }
}

fn warn_icon(no_emoji: bool) -> &'static str {
    if no_emoji {
        "! "
    } else {
        "⚠️  "
    }
}

/// Create spinner progress style
fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap()
}

/// Create bar progress style
fn create_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap()
        .progress_chars("█▓▒░  ")
}

/// Display filter for human-readable formats. Score, grade, and the
/// fail-on check keep the full corpus; only the rendered findings list
/// shrinks.
fn apply_severity_filter(report: &AnalysisReport, severity: Option<&str>) -> AnalysisReport {
    if severity != Some("high") {
        return report.clone();
    }
    let mut filtered = report.clone();
    for file in &mut filtered.files {
        file.findings.retain(|f| f.severity == Severity::High);
    }
    let all: Vec<Finding> = filtered
        .files
        .iter()
        .flat_map(|f| f.findings.clone())
        .collect();
    filtered.findings_summary = FindingsSummary::from_findings(&all);
    filtered
}

/// A directory `-o` target gets an auto-named report inside it.
fn resolve_output_path(output: &Path, format: OutputFormat) -> PathBuf {
    if output.is_dir() {
        output.join(format!(
            "linestrain-report.{}",
            reporters::file_extension(format)
        ))
    } else {
        output.to_path_buf()
    }
}

/// Check if fail threshold is met
fn check_fail_threshold(fail_on: &Option<String>, report: &AnalysisReport) -> Result<()> {
    if let Some(ref threshold) = fail_on {
        let should_fail = match threshold.to_lowercase().as_str() {
            "high" => report.findings_summary.high > 0,
            "warning" => report.findings_summary.high > 0 || report.findings_summary.warning > 0,
            _ => false,
        };
        if should_fail {
            eprintln!("Failing due to --fail-on={} threshold", threshold);
            std::process::exit(1);
        }
    }
    Ok(())
}
