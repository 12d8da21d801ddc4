//! SARIF 2.1.0 reporter for GitHub Code Scanning and VS Code integration
//!
//! Generates SARIF (Static Analysis Results Interchange Format) output
//! compliant with OASIS SARIF 2.1.0 specification.
//!
//! Reference: https://docs.oasis-open.org/sarif/sarif/v2.1.0/sarif-v2.1.0.html

use crate::engine::compose::flag_info;
use crate::models::{AnalysisReport, Finding, Flag, Severity};
use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;

/// SARIF schema URI
const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const SARIF_VERSION: &str = "2.1.0";

/// Map linestrain severity to SARIF level
fn severity_to_sarif_level(severity: &Severity) -> &'static str {
    match severity {
        Severity::High => "error",
        Severity::Warning => "warning",
    }
}

// ============================================================================
// SARIF Data Structures
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
    invocations: Vec<SarifInvocation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: String,
    version: String,
    information_uri: String,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    name: String,
    short_description: SarifMessage,
    full_description: SarifMessage,
    help: SarifMessage,
    default_configuration: SarifConfiguration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifConfiguration {
    level: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: String,
    message: SarifMessage,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    locations: Vec<SarifLocation>,
    partial_fingerprints: HashMap<String, String>,
    properties: SarifResultProperties,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<SarifRegion>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifArtifactLocation {
    uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    uri_base_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    start_line: u32,
    start_column: u32,
    end_column: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifInvocation {
    execution_successful: bool,
    end_time_utc: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResultProperties {
    severity: String,
    score: f64,
    flags: Vec<String>,
}

// ============================================================================
// Implementation
// ============================================================================

/// Render report as SARIF 2.1.0 JSON
pub fn render(report: &AnalysisReport) -> Result<String> {
    let sarif = build_sarif(report);
    Ok(serde_json::to_string_pretty(&sarif)?)
}

/// Build the complete SARIF document
fn build_sarif(report: &AnalysisReport) -> SarifReport {
    // One rule per flag: the rule set is closed, so every run carries
    // the full catalog.
    let rules: Vec<SarifRule> = Flag::ALL.iter().map(|&flag| build_rule(flag)).collect();

    let results: Vec<SarifResult> = report
        .all_findings()
        .into_iter()
        .enumerate()
        .map(|(i, f)| build_result(f, i))
        .collect();

    SarifReport {
        schema: SARIF_SCHEMA.to_string(),
        version: SARIF_VERSION.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "Linestrain".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: "https://github.com/linestrain/linestrain".to_string(),
                    rules,
                },
            },
            results,
            invocations: vec![SarifInvocation {
                execution_successful: true,
                end_time_utc: Utc::now().to_rfc3339(),
            }],
        }],
    }
}

/// Build a SARIF rule from a flag
fn build_rule(flag: Flag) -> SarifRule {
    let info = flag_info(flag);
    let default_level = if flag.is_core() { "warning" } else { "note" };

    SarifRule {
        id: rule_id(flag),
        name: flag.name().to_string(),
        short_description: SarifMessage {
            text: info.explanation.to_string(),
        },
        full_description: SarifMessage {
            text: format!("{} (example: {})", info.explanation, info.example),
        },
        help: SarifMessage {
            text: info.remediation.to_string(),
        },
        default_configuration: SarifConfiguration {
            level: default_level.to_string(),
        },
    }
}

/// Build a SARIF result from a finding
fn build_result(finding: &Finding, index: usize) -> SarifResult {
    // The leading fired flag names the result
    let rule = finding
        .flags
        .first()
        .map(|&f| rule_id(f))
        .unwrap_or_else(|| "linestrain/unknown".to_string());

    let locations: Vec<SarifLocation> = finding
        .file
        .iter()
        .map(|file| SarifLocation {
            physical_location: SarifPhysicalLocation {
                artifact_location: SarifArtifactLocation {
                    uri: file.display().to_string(),
                    uri_base_id: Some("%SRCROOT%".to_string()),
                },
                // SARIF regions are 1-based
                region: Some(SarifRegion {
                    start_line: finding.line + 1,
                    start_column: finding.span_start + 1,
                    end_column: finding.span_end + 1,
                }),
            },
        })
        .collect();

    let mut partial_fingerprints = HashMap::new();
    partial_fingerprints.insert(
        "linestrain/finding/v1".to_string(),
        if finding.id.is_empty() {
            format!("finding-{}", index)
        } else {
            finding.id.clone()
        },
    );

    SarifResult {
        rule_id: rule,
        level: severity_to_sarif_level(&finding.severity).to_string(),
        message: SarifMessage {
            text: finding.message.clone(),
        },
        locations,
        partial_fingerprints,
        properties: SarifResultProperties {
            severity: finding.severity.to_string(),
            score: finding.score,
            flags: finding.flags.iter().map(|f| f.name().to_string()).collect(),
        },
    }
}

fn rule_id(flag: Flag) -> String {
    format!("linestrain/{}", flag.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_sarif_structure() {
        let report = test_report();
        let sarif_str = render(&report).expect("render SARIF");
        let parsed: serde_json::Value = serde_json::from_str(&sarif_str).expect("parse SARIF");

        assert_eq!(parsed["version"], "2.1.0");
        let runs = parsed["runs"].as_array().expect("runs array");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0]["tool"]["driver"]["name"], "Linestrain");

        // Full rule catalog, one per flag
        let rules = runs[0]["tool"]["driver"]["rules"]
            .as_array()
            .expect("rules array");
        assert_eq!(rules.len(), Flag::ALL.len());

        let results = runs[0]["results"].as_array().expect("results array");
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_result_levels_and_regions() {
        let report = test_report();
        let sarif_str = render(&report).expect("render SARIF");
        let parsed: serde_json::Value = serde_json::from_str(&sarif_str).expect("parse SARIF");
        let results = parsed["runs"][0]["results"].as_array().unwrap();

        let levels: Vec<&str> = results
            .iter()
            .map(|r| r["level"].as_str().unwrap())
            .collect();
        assert!(levels.contains(&"error"));
        assert!(levels.contains(&"warning"));

        // Line 12 (0-based) renders as startLine 13
        let error_result = results
            .iter()
            .find(|r| r["level"] == "error")
            .expect("error result");
        assert_eq!(
            error_result["locations"][0]["physicalLocation"]["region"]["startLine"],
            13
        );
        assert_eq!(error_result["ruleId"], "linestrain/entropy-high");
    }

    #[test]
    fn test_fingerprints_present() {
        let report = test_report();
        let sarif_str = render(&report).expect("render SARIF");
        let parsed: serde_json::Value = serde_json::from_str(&sarif_str).expect("parse SARIF");
        for result in parsed["runs"][0]["results"].as_array().unwrap() {
            let fp = result["partialFingerprints"]["linestrain/finding/v1"]
                .as_str()
                .expect("fingerprint");
            assert!(!fp.is_empty());
        }
    }
}
