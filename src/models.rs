//! Core data models for linestrain
//!
//! These models are used throughout the codebase for representing
//! per-line findings, per-file reports, and the aggregate analysis
//! report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Generate a deterministic finding ID based on content hash.
///
/// This ensures findings have stable IDs across runs, enabling:
/// - Tracking findings over time (fixed vs new vs recurring)
/// - Stable fingerprints in SARIF output
/// - Reliable deduplication
///
/// The ID is a 16-character hex string derived from hashing:
/// - file path (where it was found)
/// - line index (specific location)
/// - fired flags (what the issue is)
pub fn deterministic_finding_id(file: &str, line: u32, flags: &str) -> String {
    // MD5 for stable cross-version hashing; DefaultHasher is
    // intentionally not stable across Rust/compiler versions.
    let input = format!("{file}\n{line}\n{flags}");
    let digest = md5::compute(input.as_bytes());
    format!("{:x}", digest)[..16].to_string()
}

/// Severity levels for findings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Warning,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// The closed set of per-line strain signals.
///
/// Variant order is the canonical reporting order: core signals first,
/// auxiliary signals after, `PeriodicityBias` (position-driven, not
/// content-driven) always last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flag {
    EntropyHigh,
    LongTokens,
    SymbolNoise,
    CompressHigh,
    MdlHigh,
    UniqHigh,
    EntropyJump,
    StepExcess,
    PeriodicityBias,
}

impl Flag {
    /// All flags in canonical reporting order.
    pub const ALL: [Flag; 9] = [
        Flag::EntropyHigh,
        Flag::LongTokens,
        Flag::SymbolNoise,
        Flag::CompressHigh,
        Flag::MdlHigh,
        Flag::UniqHigh,
        Flag::EntropyJump,
        Flag::StepExcess,
        Flag::PeriodicityBias,
    ];

    /// Core flags count 1.0 toward severity, auxiliary flags 0.5.
    pub fn is_core(self) -> bool {
        matches!(
            self,
            Flag::EntropyHigh
                | Flag::LongTokens
                | Flag::SymbolNoise
                | Flag::CompressHigh
                | Flag::MdlHigh
        )
    }

    /// Fixed contribution of this flag to the finding score.
    pub fn score_weight(self) -> f64 {
        match self {
            Flag::EntropyHigh => 1.0,
            Flag::LongTokens => 0.8,
            Flag::SymbolNoise => 0.6,
            Flag::CompressHigh => 0.7,
            Flag::MdlHigh => 0.7,
            Flag::UniqHigh => 0.4,
            Flag::EntropyJump => 0.3,
            Flag::StepExcess => 0.3,
            Flag::PeriodicityBias => 0.2,
        }
    }

    /// Stable kebab-case rule name, as used in config files and SARIF
    /// rule IDs.
    pub fn name(self) -> &'static str {
        match self {
            Flag::EntropyHigh => "entropy-high",
            Flag::LongTokens => "long-tokens",
            Flag::SymbolNoise => "symbol-noise",
            Flag::CompressHigh => "compress-high",
            Flag::MdlHigh => "mdl-high",
            Flag::UniqHigh => "uniq-high",
            Flag::EntropyJump => "entropy-jump",
            Flag::StepExcess => "step-excess",
            Flag::PeriodicityBias => "periodicity-bias",
        }
    }

    /// Reverse of [`Flag::name`]; `None` for unknown rule names.
    pub fn from_name(name: &str) -> Option<Flag> {
        Flag::ALL.iter().copied().find(|f| f.name() == name)
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single strained line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Finding {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub severity: Severity,
    /// 0-based line index within the analyzed text.
    #[serde(default)]
    pub line: u32,
    /// Char span within the raw line, `[span_start, span_end)`.
    #[serde(default)]
    pub span_start: u32,
    #[serde(default)]
    pub span_end: u32,
    /// Weighted sum over fired flags. Render with 2 decimals.
    #[serde(default)]
    pub score: f64,
    /// Fired flags in canonical order.
    #[serde(default)]
    pub flags: Vec<Flag>,
    #[serde(default)]
    pub message: String,
    /// Set by the file analyzer; `None` for raw text analysis.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Finding {
    /// Fired flag names joined with commas, in canonical order. Feeds
    /// fingerprints and report output.
    pub fn flag_list(&self) -> String {
        self.flags
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Summary of findings by severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub high: usize,
    pub warning: usize,
    pub total: usize,
}

impl FindingsSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for f in findings {
            match f.severity {
                Severity::High => summary.high += 1,
                Severity::Warning => summary.warning += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

/// Findings for one analyzed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub lines_scanned: usize,
    pub findings: Vec<Finding>,
}

/// Aggregate report for an analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub overall_score: f64,
    pub grade: String,
    pub files: Vec<FileReport>,
    pub findings_summary: FindingsSummary,
    pub total_lines: usize,
    pub total_files: usize,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Build a report from per-file results, computing score and grade.
    pub fn from_files(files: Vec<FileReport>) -> Self {
        let total_lines: usize = files.iter().map(|f| f.lines_scanned).sum();
        let all: Vec<Finding> = files.iter().flat_map(|f| f.findings.clone()).collect();
        let findings_summary = FindingsSummary::from_findings(&all);
        let overall_score = Self::strain_score(&all, total_lines);
        let grade = Self::grade_from_score(overall_score);
        Self {
            overall_score,
            grade,
            total_files: files.len(),
            files,
            findings_summary,
            total_lines,
            generated_at: Utc::now(),
        }
    }

    /// Flatten findings across all files, preserving file order.
    pub fn all_findings(&self) -> Vec<&Finding> {
        self.files.iter().flat_map(|f| f.findings.iter()).collect()
    }

    /// Document strain score in `[25, 100]`.
    ///
    /// Per-finding deductions (High 5.0, Warning 1.5) are scaled by a
    /// sqrt size factor so one noisy line cannot tank a large corpus,
    /// while small files still feel each finding.
    pub fn strain_score(findings: &[Finding], total_lines: usize) -> f64 {
        if total_lines == 0 {
            return 100.0;
        }
        let size_factor = (total_lines as f64).sqrt().max(5.0);
        let deductions: f64 = findings
            .iter()
            .map(|f| match f.severity {
                Severity::High => 5.0,
                Severity::Warning => 1.5,
            })
            .sum();
        let penalty = deductions / size_factor * 10.0;
        (100.0 - penalty).max(25.0).min(100.0)
    }

    /// Calculate grade from score
    pub fn grade_from_score(score: f64) -> String {
        match score {
            s if s >= 90.0 => "A".to_string(),
            s if s >= 80.0 => "B".to_string(),
            s if s >= 70.0 => "C".to_string(),
            s if s >= 60.0 => "D".to_string(),
            _ => "F".to_string(),
        }
    }
}
