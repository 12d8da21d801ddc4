//! Configuration module for linestrain
//!
//! This module handles:
//! - Project-level configuration (linestrain.toml)
//! - Per-rule enable/threshold overrides
//! - Path exclusion patterns
//! - CLI defaults

use crate::engine::flags::Thresholds;
use crate::engine::EngineConfig;
use crate::models::Flag;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while reading a config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Project-level configuration loaded from linestrain.toml or similar
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProjectConfig {
    /// Engine-wide knobs
    #[serde(default)]
    pub engine: EngineSection,

    /// Per-rule configuration overrides, keyed by rule name
    /// (e.g. `entropy-high`)
    #[serde(default)]
    pub rules: HashMap<String, RuleOverride>,

    /// Path exclusion patterns
    #[serde(default)]
    pub exclude: ExcludeConfig,

    /// Default CLI flags
    #[serde(default)]
    pub defaults: CliDefaults,
}

/// Engine-wide configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EngineSection {
    /// Lines with fewer tokens are exempt (default: 4)
    #[serde(default)]
    pub min_tokens: Option<usize>,

    /// Warnings scoring below this are dropped (default: 1.0)
    #[serde(default)]
    pub score_floor: Option<f64>,
}

/// Configuration override for a specific rule
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RuleOverride {
    /// Whether the rule is enabled (default: true)
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Override the rule's primary threshold
    #[serde(default)]
    pub threshold: Option<ThresholdValue>,
}

/// A threshold value can be an integer or a float
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Integer(i64),
    Float(f64),
}

impl ThresholdValue {
    /// Get as f64
    pub fn as_f64(&self) -> f64 {
        match self {
            ThresholdValue::Integer(v) => *v as f64,
            ThresholdValue::Float(v) => *v,
        }
    }
}

/// Path exclusion configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExcludeConfig {
    /// Paths/patterns to exclude from analysis
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Default CLI flags that can be set in project config
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CliDefaults {
    /// Default output format (text, json, sarif, markdown)
    #[serde(default)]
    pub format: Option<String>,

    /// Default minimum severity filter (warning, high)
    #[serde(default)]
    pub severity: Option<String>,

    /// Fail-on severity threshold for CI (warning, high)
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Default number of findings to show
    #[serde(default)]
    pub top: Option<usize>,

    /// Disable emoji by default
    #[serde(default)]
    pub no_emoji: Option<bool>,
}

/// Load project configuration from the scan root.
///
/// Searches for configuration files in this order:
/// 1. `linestrain.toml`
/// 2. `.linestrainrc.json`
///
/// Returns default configuration if no config file is found. A config
/// file that fails to parse logs a warning and falls through; loading
/// never aborts analysis.
pub fn load_project_config(root: &Path) -> ProjectConfig {
    let toml_path = root.join("linestrain.toml");
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    let json_path = root.join(".linestrainrc.json");
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", json_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

fn load_toml_config(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = toml::from_str(&content)?;
    Ok(config)
}

fn load_json_config(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig = serde_json::from_str(&content)?;
    Ok(config)
}

impl ProjectConfig {
    /// Translate config into an engine configuration. Unknown rule
    /// names are skipped with a warning; the rule set is closed.
    pub fn engine_config(&self) -> EngineConfig {
        let mut thresholds = Thresholds::default();
        if let Some(min_tokens) = self.engine.min_tokens {
            thresholds.min_tokens = min_tokens;
        }
        if let Some(score_floor) = self.engine.score_floor {
            thresholds.score_floor = score_floor;
        }

        let mut disabled = Vec::new();
        for (name, rule) in &self.rules {
            let Some(flag) = Flag::from_name(name) else {
                warn!("Unknown rule '{name}' in config, ignoring");
                continue;
            };
            if rule.enabled == Some(false) {
                disabled.push(flag);
            }
            if let Some(value) = &rule.threshold {
                thresholds.set_rule_threshold(flag, value.as_f64());
            }
        }
        disabled.sort();

        EngineConfig {
            thresholds,
            disabled,
        }
    }

    /// Check if a path should be excluded
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.exclude.paths {
            if glob_match(pattern, &path_str) {
                return true;
            }
        }

        false
    }
}

/// Simple glob matching (supports * and **)
fn glob_match(pattern: &str, path: &str) -> bool {
    // Handle **/X/** patterns (match if path contains X as a directory)
    if pattern.starts_with("**/") && pattern.ends_with("/**") {
        let middle = pattern.trim_start_matches("**/").trim_end_matches("/**");
        return path.contains(&format!("/{}/", middle)) || path.starts_with(&format!("{}/", middle));
    }

    // Handle ** (match any path segments)
    if pattern.contains("**") {
        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');

            if !prefix.is_empty() && !path.starts_with(prefix) {
                return false;
            }

            // Handle * wildcard within the suffix, e.g. **/*.draft.md
            if !suffix.is_empty() && !suffix.contains('*') && !path.ends_with(suffix) {
                return false;
            }
            if !suffix.is_empty() && suffix.contains('*') {
                let star_parts: Vec<&str> = suffix.split('*').collect();
                if star_parts.len() == 2 {
                    let before = star_parts[0];
                    let after = star_parts[1];
                    let matches = if before.is_empty() {
                        path.ends_with(after)
                    } else {
                        path.contains(before) && path.ends_with(after)
                    };
                    if !matches {
                        return false;
                    }
                }
            }

            return true;
        }
    }

    // Handle single * (match within segment)
    if pattern.contains('*') {
        let parts: Vec<&str> = pattern.split('*').collect();
        if parts.len() == 2 {
            return path.starts_with(parts[0]) && path.ends_with(parts[1]);
        }
    }

    // Exact match or prefix match (for directories)
    path.starts_with(pattern) || path == pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[engine]
min_tokens = 6
score_floor = 0.5

[rules.entropy-high]
threshold = 5.0

[rules.periodicity-bias]
enabled = false
threshold = 32

[exclude]
paths = ["**/vendor/**", "CHANGELOG.md"]

[defaults]
format = "json"
fail_on = "high"
no_emoji = true
"#;
        let config: ProjectConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.min_tokens, Some(6));
        assert_eq!(config.exclude.paths.len(), 2);
        assert_eq!(config.defaults.format.as_deref(), Some("json"));
        assert_eq!(config.defaults.fail_on.as_deref(), Some("high"));

        let engine_config = config.engine_config();
        assert_eq!(engine_config.thresholds.min_tokens, 6);
        assert_eq!(engine_config.thresholds.score_floor, 0.5);
        assert_eq!(engine_config.thresholds.entropy_high, 5.0);
        assert_eq!(engine_config.thresholds.positional_period, 32);
        assert_eq!(engine_config.disabled, vec![Flag::PeriodicityBias]);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: ProjectConfig = toml::from_str("").unwrap();
        let engine_config = config.engine_config();
        assert_eq!(engine_config.thresholds, Thresholds::default());
        assert!(engine_config.disabled.is_empty());
    }

    #[test]
    fn test_unknown_rule_ignored() {
        let toml_str = r#"
[rules.no-such-rule]
enabled = false
threshold = 1.0
"#;
        let config: ProjectConfig = toml::from_str(toml_str).unwrap();
        let engine_config = config.engine_config();
        assert!(engine_config.disabled.is_empty());
        assert_eq!(engine_config.thresholds, Thresholds::default());
    }

    #[test]
    fn test_threshold_integer_accepted() {
        let toml_str = r#"
[rules.uniq-high]
threshold = 1
"#;
        let config: ProjectConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine_config().thresholds.uniq_ratio, 1.0);
    }

    #[test]
    fn test_should_exclude_globs() {
        let mut config = ProjectConfig::default();
        config.exclude.paths = vec![
            "**/vendor/**".to_string(),
            "docs/generated".to_string(),
            "*.tmp.md".to_string(),
            "**/*.draft.md".to_string(),
            "**/gen-*.md".to_string(),
        ];
        assert!(config.should_exclude(Path::new("a/vendor/b.md")));
        assert!(config.should_exclude(Path::new("docs/generated/api.md")));
        assert!(config.should_exclude(Path::new("notes.tmp.md")));
        // Star inside the ** suffix: bare extension and stem forms.
        assert!(config.should_exclude(Path::new("docs/notes.draft.md")));
        assert!(config.should_exclude(Path::new("docs/gen-api.md")));
        assert!(!config.should_exclude(Path::new("docs/guide.md")));
    }

    #[test]
    fn test_load_prefers_toml_over_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("linestrain.toml"),
            "[engine]\nmin_tokens = 7\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(".linestrainrc.json"),
            r#"{"engine": {"min_tokens": 9}}"#,
        )
        .unwrap();

        let config = load_project_config(dir.path());
        assert_eq!(config.engine.min_tokens, Some(7));
    }

    #[test]
    fn test_load_falls_back_to_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".linestrainrc.json"),
            r#"{"engine": {"min_tokens": 9}}"#,
        )
        .unwrap();

        let config = load_project_config(dir.path());
        assert_eq!(config.engine.min_tokens, Some(9));
    }

    #[test]
    fn test_invalid_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("linestrain.toml"), "not [ valid").unwrap();

        let config = load_project_config(dir.path());
        assert!(config.engine.min_tokens.is_none());
    }
}
