//! `linestrain watch` - live re-scoring on file changes
//!
//! Watches a tree for prose saves and re-runs the engine on changed
//! files, printing new and fixed findings as deltas.

use anyhow::Result;
use console::style;
use notify::RecursiveMode;
use notify_debouncer_full::{new_debouncer, DebounceEventResult};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use crate::analyzer::{analyze_file, PROSE_EXTENSIONS};
use crate::config::load_project_config;
use crate::engine::Engine;
use crate::models::{Finding, Severity};

pub fn run(path: &Path, relaxed: bool, no_emoji: bool) -> Result<()> {
    let root = std::fs::canonicalize(path)?;

    let icon = if no_emoji { "" } else { "👁️  " };
    println!(
        "\n{}Watching {} for prose changes...\n",
        style(icon).bold(),
        style(root.display()).cyan()
    );
    println!("  {} Save a file to trigger re-scoring", style("→").dim());
    println!("  {} Press Ctrl+C to stop\n", style("→").dim());

    let project_config = load_project_config(&root);
    let engine = Engine::with_config(project_config.engine_config());

    // Set up file watcher with debouncing
    let (tx, rx) = mpsc::channel();

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        None,
        move |result: DebounceEventResult| {
            if let Ok(events) = result {
                let _ = tx.send(events);
            }
        },
    )?;

    debouncer.watch(&root, RecursiveMode::Recursive)?;

    // Track findings per file for diff display
    let mut previous_findings: HashMap<PathBuf, Vec<Finding>> = HashMap::new();
    let mut total_catches = 0u32;

    // Main event loop
    loop {
        match rx.recv() {
            Ok(events) => {
                // Collect unique changed prose files
                let changed_files: HashSet<PathBuf> = events
                    .iter()
                    .flat_map(|event| event.paths.iter())
                    .filter(|p| is_prose_file(p) && !project_config.should_exclude(p))
                    .cloned()
                    .collect();

                if changed_files.is_empty() {
                    continue;
                }

                for file_path in &changed_files {
                    // Deleted or unreadable means no findings remain
                    let mut findings = match analyze_file(&engine, file_path) {
                        Ok(report) => report.findings,
                        Err(_) => vec![],
                    };

                    if relaxed {
                        findings.retain(|f| f.severity == Severity::High);
                    }

                    let prev = previous_findings
                        .get(file_path)
                        .cloned()
                        .unwrap_or_default();
                    total_catches +=
                        display_file_diff(file_path, &root, &findings, &prev, no_emoji);
                    previous_findings.insert(file_path.clone(), findings);
                }
            }
            Err(_) => break,
        }
    }

    println!(
        "\n{} Caught {} strained lines during watch session.",
        if no_emoji { "" } else { "📊" },
        total_catches
    );
    Ok(())
}

/// Check if a path has a prose extension
fn is_prose_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |ext| {
            PROSE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        })
}

/// Display diff between previous and current findings for a file.
/// Returns count of new catches.
///
/// Finding IDs hash file, line, and fired flags, so ID equality is the
/// change test.
fn display_file_diff(
    file_path: &Path,
    root: &Path,
    findings: &[Finding],
    prev: &[Finding],
    no_emoji: bool,
) -> u32 {
    let rel_path = file_path.strip_prefix(root).unwrap_or(file_path);

    let new_findings: Vec<_> = findings
        .iter()
        .filter(|f| !prev.iter().any(|pf| pf.id == f.id))
        .collect();
    let fixed_findings: Vec<_> = prev
        .iter()
        .filter(|pf| !findings.iter().any(|f| f.id == pf.id))
        .collect();

    if new_findings.is_empty() && fixed_findings.is_empty() {
        if !findings.is_empty() {
            let time = chrono::Local::now().format("%H:%M:%S");
            println!(
                "{} {} {} ({} findings, no changes)",
                style(format!("[{}]", time)).dim(),
                if no_emoji { "→" } else { "📝" },
                style(rel_path.display()).dim(),
                findings.len()
            );
        }
        return 0;
    }

    let time = chrono::Local::now().format("%H:%M:%S");
    println!(
        "{} {} {}",
        style(format!("[{}]", time)).dim(),
        if no_emoji { "→" } else { "📝" },
        style(rel_path.display()).cyan().bold()
    );

    let mut catches = 0u32;
    for f in &new_findings {
        catches += 1;
        println!(
            "  {} {} {} (score {:.2})",
            severity_icon(f.severity, no_emoji),
            style(f.flag_list()).yellow(),
            style(format!("{}:{}", rel_path.display(), f.line + 1)).dim(),
            f.score
        );
    }

    for f in &fixed_findings {
        println!(
            "  {} {} {}",
            if no_emoji { "FIX " } else { "✅" },
            style(f.flag_list()).green(),
            style(format!("{}:{}", rel_path.display(), f.line + 1)).dim()
        );
    }

    println!();
    catches
}

/// Map severity to display icon
fn severity_icon(severity: Severity, no_emoji: bool) -> &'static str {
    match (severity, no_emoji) {
        (Severity::High, true) => "HIGH",
        (Severity::High, false) => "🟠",
        (Severity::Warning, true) => "WARN",
        (Severity::Warning, false) => "🟡",
    }
}
