//! Init command - drop a starter linestrain.toml

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

const STARTER_CONFIG: &str = r#"# Linestrain configuration
# Place this file at the root of the tree you scan.

[engine]
# Lines with fewer tokens than this are never flagged.
# min_tokens = 4

# Warnings scoring below this are dropped. High findings always survive.
# score_floor = 1.0

# Per-rule overrides, keyed by the rule names shown in report output.
# [rules.entropy-high]
# enabled = true
# threshold = 4.5

# [rules.step-excess]
# enabled = false

[exclude]
# Glob patterns skipped during directory scans.
paths = ["**/node_modules/**", "**/target/**"]

[defaults]
# Flags applied when the command line does not override them.
# format = "text"
# severity = "high"
# fail_on = "high"
# top = 20
# no_emoji = false
"#;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    println!("\n{} Initializing linestrain\n", style("🧵").bold());

    let config_path = root.join("linestrain.toml");
    if config_path.exists() {
        println!(
            "{} {} already exists, leaving it untouched",
            style("✓").green(),
            style("linestrain.toml").cyan()
        );
    } else {
        std::fs::write(&config_path, STARTER_CONFIG)
            .with_context(|| "Failed to create config file")?;
        println!(
            "{} Created {}",
            style("✓").green(),
            style("linestrain.toml").cyan()
        );
    }

    println!("\nNext steps:");
    println!("  {} Score your docs", style("linestrain analyze .").cyan());
    println!(
        "  {} Live re-scoring while you edit",
        style("linestrain watch .").cyan()
    );

    Ok(())
}
