//! CLI command definitions and handlers

pub(crate) mod analyze;
mod init;
mod watch;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Linestrain - per-line prose strain linting
///
/// 100% LOCAL - No account needed. No data leaves your machine.
#[derive(Parser, Debug)]
#[command(name = "linestrain")]
#[command(
    version,
    about = "Per-line prose strain linting: flag generated-text filler in docs, prompts, and READMEs",
    long_about = "Linestrain scores every line of your prose against a bundle of statistical \
metrics (entropy, token shape, compressibility) and flags the lines that read like \
machine-generated filler.\n\n\
100% LOCAL. No account needed. No data leaves your machine.\n\n\
Run without a subcommand to analyze the current directory:\n  \
linestrain .",
    after_help = "\
Examples:
  linestrain .                          Analyze current directory
  linestrain analyze . --format json    JSON output for scripting
  linestrain analyze . --severity high  Show only high findings
  linestrain analyze . --fail-on high   Exit code 1 on high findings (CI mode)
  linestrain watch .                    Re-score prose as you edit

Documentation: https://github.com/linestrain/linestrain"
)]
pub struct Cli {
    /// Path to a file or directory to scan (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a linestrain.toml config file with example settings
    Init,

    /// Analyze prose files and score per-line strain
    #[command(after_help = "\
Examples:
  linestrain analyze .                               Analyze current directory
  linestrain analyze README.md                       Analyze a single file
  linestrain analyze . --format json                 JSON output for scripting
  linestrain analyze . --format sarif -o out.sarif.json   SARIF for GitHub Code Scanning
  linestrain analyze . --severity high               Only show high findings
  linestrain analyze . --fail-on warning             Exit code 1 on any finding (CI mode)
  linestrain analyze . --top 0                       Show every finding")]
    Analyze {
        /// Output format: text, json, sarif, markdown (or md)
        #[arg(long, short = 'f', value_parser = ["text", "json", "sarif", "markdown", "md"])]
        format: Option<String>,

        /// Output file path (default: stdout; a directory gets an auto-named report)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Minimum severity to show (high, warning)
        #[arg(long, value_parser = ["high", "warning"])]
        severity: Option<String>,

        /// Maximum findings to show (0 = all)
        #[arg(long)]
        top: Option<usize>,

        /// Exit with code 1 if findings at this severity or higher exist
        #[arg(long, value_parser = ["high", "warning"])]
        fail_on: Option<String>,

        /// Disable emoji in output (cleaner for CI logs)
        #[arg(long)]
        no_emoji: bool,

        /// Suppress progress output, print only the report
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Watch for prose changes and re-score in real-time (debounced)
    ///
    /// Monitors the tree for saves and re-runs the engine on changed
    /// files, printing new and fixed findings as deltas.
    Watch {
        /// Only show high findings
        #[arg(long)]
        relaxed: bool,

        /// Disable emoji in output
        #[arg(long)]
        no_emoji: bool,
    },

    /// Show version information
    Version,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Init) => init::run(&cli.path),

        Some(Commands::Analyze {
            format,
            output,
            severity,
            top,
            fail_on,
            no_emoji,
            quiet,
        }) => analyze::run(
            &cli.path,
            format.as_deref(),
            output.as_deref(),
            severity,
            top,
            fail_on,
            no_emoji,
            quiet,
        ),

        Some(Commands::Watch { relaxed, no_emoji }) => watch::run(&cli.path, relaxed, no_emoji),

        Some(Commands::Version) => {
            println!("linestrain {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }

        // Bare `linestrain .` analyzes with defaults
        None => analyze::run(&cli.path, None, None, None, None, None, false, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_bare_path() {
        let cli = Cli::try_parse_from(["linestrain", "docs/"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("docs/"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parses_analyze_flags() {
        let cli = Cli::try_parse_from([
            "linestrain",
            "analyze",
            ".",
            "--format",
            "json",
            "--fail-on",
            "high",
            "--top",
            "0",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Analyze {
                format,
                fail_on,
                top,
                ..
            }) => {
                assert_eq!(format.as_deref(), Some("json"));
                assert_eq!(fail_on.as_deref(), Some("high"));
                assert_eq!(top, Some(0));
            }
            other => panic!("expected analyze command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["linestrain", "analyze", ".", "--format", "yaml"]).is_err());
    }
}
