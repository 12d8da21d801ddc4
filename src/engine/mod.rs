//! Per-line strain engine
//!
//! The engine runs the full pipeline over a text, one line at a time:
//!
//! ```text
//! raw line
//!   -> normalize      (links, emphasis, placeholders)
//!   -> metrics        (entropy, tokens, symbols, RLE, MDL, steps)
//!   -> flags          (core + auxiliary signals)
//!   -> aggregate      (severity, weighted score, floor)
//!   -> compose        (finding with message and span)
//! ```
//!
//! The engine is total and pure: it never fails, performs no I/O, and
//! produces identical findings for identical input. Lines are scored
//! strictly in order; the only state carried across lines is the
//! previous line's entropy and blankness.

pub mod compose;
pub mod flags;
pub mod metrics;
pub mod normalize;

use crate::models::{deterministic_finding_id, Finding, Flag};
use flags::Thresholds;
use metrics::LineMetrics;
use normalize::normalize_line;
use tracing::trace;

/// Engine configuration: thresholds plus the set of disabled rules.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub thresholds: Thresholds,
    pub disabled: Vec<Flag>,
}

/// Single-slot accumulator carried between consecutive lines.
#[derive(Debug, Clone, Copy)]
struct PrevLine {
    entropy: f64,
    blank: bool,
}

/// Scores each line of a text for generated-text strain.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with explicit configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze a whole text, returning findings in line order.
    ///
    /// Lines exempt from flagging (fewer than `min_tokens` tokens, or
    /// ATX headings) still have their metrics computed, so the
    /// entropy-jump accumulator never skips a line.
    pub fn analyze(&self, text: &str) -> Vec<Finding> {
        let thresholds = &self.config.thresholds;
        let mut findings = Vec::new();
        let mut prev: Option<PrevLine> = None;

        for (idx, raw) in text.lines().enumerate() {
            let normalized = normalize_line(raw);
            let metrics = LineMetrics::compute(&normalized);

            let positional = thresholds.positional_period > 0
                && (idx + 1) % thresholds.positional_period == 0;
            let jump = match prev {
                Some(p) => !p.blank && metrics.entropy - p.entropy > thresholds.entropy_jump,
                None => false,
            };

            let exempt = metrics.token_count < thresholds.min_tokens || flags::is_heading(raw);
            if !exempt {
                let fired = flags::evaluate(
                    &metrics,
                    positional,
                    jump,
                    thresholds,
                    &self.config.disabled,
                );
                if let Some((severity, score)) = flags::aggregate(&fired, thresholds) {
                    trace!(line = idx, ?severity, score, ?fired, "line flagged");
                    findings.push(self.build_finding(idx, raw, severity, score, fired));
                }
            }

            prev = Some(PrevLine {
                entropy: metrics.entropy,
                blank: raw.trim().is_empty(),
            });
        }

        findings
    }

    fn build_finding(
        &self,
        idx: usize,
        raw: &str,
        severity: crate::models::Severity,
        score: f64,
        fired: Vec<Flag>,
    ) -> Finding {
        let flag_names: Vec<&str> = fired.iter().map(|f| f.name()).collect();
        let id = deterministic_finding_id("", idx as u32, &flag_names.join(","));
        Finding {
            id,
            severity,
            line: idx as u32,
            span_start: 0,
            span_end: raw.chars().count() as u32,
            score,
            message: compose::compose_message(&fired),
            flags: fired,
            file: None,
        }
    }
}
