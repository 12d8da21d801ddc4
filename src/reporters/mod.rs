//! Output reporters for linestrain analysis results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON
//! - `sarif` - SARIF 2.1.0 for GitHub Code Scanning / VS Code
//! - `markdown` - GitHub-flavored Markdown

mod json;
mod markdown;
mod sarif;
mod text;

use crate::models::AnalysisReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Sarif,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, sarif, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sarif => write!(f, "sarif"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Options shared by the human-facing renderers
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Maximum findings to show (0 = all)
    pub top: usize,
    pub no_emoji: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            top: 20,
            no_emoji: false,
        }
    }
}

/// Render an analysis report in the specified format
pub fn report(report: &AnalysisReport, format: &str, options: RenderOptions) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(report, fmt, options)
}

/// Render an analysis report using an OutputFormat enum
pub fn report_with_format(
    report: &AnalysisReport,
    format: OutputFormat,
    options: RenderOptions,
) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report, options),
        OutputFormat::Json => json::render(report),
        OutputFormat::Sarif => sarif::render(report),
        OutputFormat::Markdown => markdown::render(report, options),
    }
}

/// Get the recommended file extension for a format
pub fn file_extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Text => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Sarif => "sarif.json",
        OutputFormat::Markdown => "md",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Create a minimal AnalysisReport for testing
    pub(crate) fn test_report() -> AnalysisReport {
        use crate::models::{FileReport, Finding, Flag, Severity};

        let findings = vec![
            Finding {
                id: "00112233aabbccdd".into(),
                severity: Severity::High,
                line: 12,
                span_start: 0,
                span_end: 40,
                score: 2.4,
                flags: vec![Flag::EntropyHigh, Flag::CompressHigh, Flag::MdlHigh],
                message: crate::engine::compose::compose_message(&[
                    Flag::EntropyHigh,
                    Flag::CompressHigh,
                    Flag::MdlHigh,
                ]),
                file: Some("docs/intro.md".into()),
            },
            Finding {
                id: "aabbccdd00112233".into(),
                severity: Severity::Warning,
                line: 3,
                span_start: 0,
                span_end: 28,
                score: 1.0,
                flags: vec![Flag::EntropyHigh],
                message: crate::engine::compose::compose_message(&[Flag::EntropyHigh]),
                file: Some("README.md".into()),
            },
        ];

        AnalysisReport::from_files(vec![
            FileReport {
                path: "docs/intro.md".into(),
                lines_scanned: 120,
                findings: vec![findings[0].clone()],
            },
            FileReport {
                path: "README.md".into(),
                lines_scanned: 40,
                findings: vec![findings[1].clone()],
            },
        ])
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str("sarif").unwrap(),
            OutputFormat::Sarif
        );
        assert_eq!(
            OutputFormat::from_str("md").unwrap(),
            OutputFormat::Markdown
        );
        assert!(OutputFormat::from_str("html").is_err());
    }

    #[test]
    fn test_every_format_renders() {
        let rep = test_report();
        for fmt in [
            OutputFormat::Text,
            OutputFormat::Json,
            OutputFormat::Sarif,
            OutputFormat::Markdown,
        ] {
            let out = report_with_format(&rep, fmt, RenderOptions::default()).unwrap();
            assert!(!out.is_empty());
        }
    }
}
