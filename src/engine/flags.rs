//! Flag evaluation and severity aggregation
//!
//! Turns a line's metric profile into the set of fired flags, then
//! folds that set into a severity and a weighted score. Thresholds are
//! fixed by default and overridable per rule through config.

use crate::engine::metrics::LineMetrics;
use crate::models::{Flag, Severity};
use regex::Regex;
use std::sync::OnceLock;

static HEADING_PATTERN: OnceLock<Regex> = OnceLock::new();

fn heading_pattern() -> &'static Regex {
    HEADING_PATTERN.get_or_init(|| Regex::new(r"^ {0,3}#").expect("valid regex"))
}

/// ATX heading with up to three leading spaces. Checked against the
/// raw line, before normalization.
pub fn is_heading(raw: &str) -> bool {
    heading_pattern().is_match(raw)
}

/// Tunable thresholds for flag evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Bits; fires `EntropyHigh` at or above this.
    pub entropy_high: f64,
    /// Mean token length in chars; fires `LongTokens` at or above this.
    pub long_tokens: f64,
    /// Fraction of symbol chars; fires `SymbolNoise` at or above this.
    pub symbol_noise: f64,
    /// RLE ratio; fires `CompressHigh` at or above this.
    pub compress_high: f64,
    /// Bits; fires `MdlHigh` at or above this.
    pub mdl_high: f64,
    /// `UniqHigh` needs at least this many tokens.
    pub uniq_min_tokens: usize,
    /// Distinct/total token ratio; fires `UniqHigh` above this.
    pub uniq_ratio: f64,
    /// Bits of increase over the previous line; fires `EntropyJump`.
    pub entropy_jump: f64,
    /// `StepExcess` fires when step cues exceed
    /// `ceil(sqrt(tokens) * step_factor)`.
    pub step_factor: f64,
    /// 1-based line indices at multiples of this carry positional bias.
    pub positional_period: usize,
    /// Lines with fewer tokens than this are exempt from flagging.
    pub min_tokens: usize,
    /// Warnings scoring below this are dropped.
    pub score_floor: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            entropy_high: 4.3,
            long_tokens: 11.0,
            symbol_noise: 0.28,
            compress_high: 0.92,
            mdl_high: 4.3,
            uniq_min_tokens: 15,
            uniq_ratio: 0.98,
            entropy_jump: 1.5,
            step_factor: (10f64).log2(),
            positional_period: 64,
            min_tokens: 4,
            score_floor: 1.0,
        }
    }
}

impl Thresholds {
    /// Apply a per-rule threshold override from config. Each rule maps
    /// to its primary knob; rules without a numeric knob ignore the
    /// override.
    pub fn set_rule_threshold(&mut self, flag: Flag, value: f64) {
        match flag {
            Flag::EntropyHigh => self.entropy_high = value,
            Flag::LongTokens => self.long_tokens = value,
            Flag::SymbolNoise => self.symbol_noise = value,
            Flag::CompressHigh => self.compress_high = value,
            Flag::MdlHigh => self.mdl_high = value,
            Flag::UniqHigh => self.uniq_ratio = value,
            Flag::EntropyJump => self.entropy_jump = value,
            Flag::StepExcess => self.step_factor = value,
            Flag::PeriodicityBias => self.positional_period = value as usize,
        }
    }
}

/// Evaluate all flags for one line, in canonical order.
///
/// `positional` and `jump` are computed by the engine from line index
/// and the previous-line accumulator. `PeriodicityBias` depends only
/// on line position, independent of content.
pub fn evaluate(
    metrics: &LineMetrics,
    positional: bool,
    jump: bool,
    thresholds: &Thresholds,
    disabled: &[Flag],
) -> Vec<Flag> {
    let enabled = |flag: Flag| !disabled.contains(&flag);
    let mut fired = Vec::new();

    if enabled(Flag::EntropyHigh) && metrics.entropy >= thresholds.entropy_high {
        fired.push(Flag::EntropyHigh);
    }
    if enabled(Flag::LongTokens) && metrics.avg_token_len >= thresholds.long_tokens {
        fired.push(Flag::LongTokens);
    }
    if enabled(Flag::SymbolNoise) && metrics.symbol_density >= thresholds.symbol_noise {
        fired.push(Flag::SymbolNoise);
    }
    if enabled(Flag::CompressHigh) && metrics.compression_ratio >= thresholds.compress_high {
        fired.push(Flag::CompressHigh);
    }
    if enabled(Flag::MdlHigh) && metrics.mdl_ratio >= thresholds.mdl_high {
        fired.push(Flag::MdlHigh);
    }
    if enabled(Flag::UniqHigh)
        && metrics.token_count >= thresholds.uniq_min_tokens
        && metrics.unique_token_ratio > thresholds.uniq_ratio
    {
        fired.push(Flag::UniqHigh);
    }
    if enabled(Flag::EntropyJump) && jump {
        fired.push(Flag::EntropyJump);
    }
    let step_limit = ((metrics.token_count as f64).sqrt() * thresholds.step_factor).ceil();
    if enabled(Flag::StepExcess) && metrics.step_count as f64 > step_limit {
        fired.push(Flag::StepExcess);
    }
    if enabled(Flag::PeriodicityBias) && positional {
        fired.push(Flag::PeriodicityBias);
    }

    fired
}

/// Fold fired flags into severity and score.
///
/// Core flags weigh 1.0 and auxiliary flags 0.5 toward severity; a
/// combined weight of 3.0 or more is High. Warnings scoring below the
/// floor are suppressed; High findings never are.
pub fn aggregate(fired: &[Flag], thresholds: &Thresholds) -> Option<(Severity, f64)> {
    if fired.is_empty() {
        return None;
    }
    let combined: f64 = fired
        .iter()
        .map(|f| if f.is_core() { 1.0 } else { 0.5 })
        .sum();
    let severity = if combined >= 3.0 {
        Severity::High
    } else {
        Severity::Warning
    };
    let score: f64 = fired.iter().map(|f| f.score_weight()).sum();
    if severity == Severity::Warning && score < thresholds.score_floor {
        return None;
    }
    Some((severity, score))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics_for(line: &str) -> LineMetrics {
        LineMetrics::compute(line)
    }

    #[test]
    fn test_heading_detection() {
        assert!(is_heading("# Title"));
        assert!(is_heading("   ## Sub"));
        assert!(is_heading("#no space"));
        assert!(!is_heading("    # four spaces is code"));
        assert!(!is_heading("plain line"));
    }

    /// A line below every threshold: repeated runs keep the RLE ratio
    /// and entropy low, short tokens, no symbols.
    const QUIET: &str = "aaaa bbbb aaaa bbbb";

    #[test]
    fn test_quiet_line_fires_nothing() {
        let m = metrics_for(QUIET);
        let fired = evaluate(&m, false, false, &Thresholds::default(), &[]);
        assert!(fired.is_empty());
    }

    #[test]
    fn test_long_tokens_fires() {
        let m = metrics_for(
            "internationalization localization containerization orchestration virtualization",
        );
        let fired = evaluate(&m, false, false, &Thresholds::default(), &[]);
        assert!(fired.contains(&Flag::LongTokens));
    }

    #[test]
    fn test_symbol_noise_fires() {
        let m = metrics_for("x=1;y=2;z=3;//@#$%^&*()!~");
        let fired = evaluate(&m, false, false, &Thresholds::default(), &[]);
        assert!(fired.contains(&Flag::SymbolNoise));
    }

    #[test]
    fn test_compress_high_boundary() {
        let thresholds = Thresholds::default();
        // One run of four plus 21 distinct chars: 23 units / 25 chars,
        // exactly at the 0.92 threshold. Inclusive comparison fires.
        let at = metrics_for("aaaabcdefghijklmnopqrstuv");
        assert_eq!(at.compression_ratio, 0.92);
        let fired = evaluate(&at, false, false, &thresholds, &[]);
        assert!(fired.contains(&Flag::CompressHigh));

        // Heavily compressible line stays quiet
        let low = metrics_for("aaaaaaaaaabbbbbbbbbb");
        assert!(low.compression_ratio < thresholds.compress_high);
        let fired = evaluate(&low, false, false, &thresholds, &[]);
        assert!(!fired.contains(&Flag::CompressHigh));
    }

    #[test]
    fn test_step_excess_fires_past_sublinear_limit() {
        // 16 ordinal tokens: step count 16 against a limit of
        // ceil(sqrt(16) * log2(10)) = 14.
        let m = metrics_for(
            "first second third fourth fifth sixth seventh eighth ninth tenth \
             first second third fourth fifth sixth",
        );
        assert_eq!(m.step_count, 16);
        let fired = evaluate(&m, false, false, &Thresholds::default(), &[]);
        assert_eq!(fired, vec![Flag::CompressHigh, Flag::StepExcess]);
    }

    #[test]
    fn test_entropy_jump_passthrough() {
        let m = metrics_for(QUIET);
        let fired = evaluate(&m, false, true, &Thresholds::default(), &[]);
        assert_eq!(fired, vec![Flag::EntropyJump]);
    }

    #[test]
    fn test_periodicity_fires_on_position_alone() {
        let m = metrics_for(QUIET);
        let fired = evaluate(&m, true, false, &Thresholds::default(), &[]);
        assert_eq!(fired, vec![Flag::PeriodicityBias]);

        let fired = evaluate(&m, true, true, &Thresholds::default(), &[]);
        assert_eq!(fired, vec![Flag::EntropyJump, Flag::PeriodicityBias]);
    }

    #[test]
    fn test_disabled_rule_skipped() {
        let m = metrics_for(QUIET);
        let fired = evaluate(&m, false, true, &Thresholds::default(), &[Flag::EntropyJump]);
        assert!(fired.is_empty());
    }

    #[test]
    fn test_canonical_order() {
        let m = LineMetrics {
            char_count: 30,
            token_count: 16,
            entropy: 5.0,
            avg_token_len: 12.0,
            unique_token_ratio: 1.0,
            symbol_density: 0.5,
            case_switch_rate: 0.0,
            compression_ratio: 1.0,
            mdl_ratio: 5.0,
            step_count: 0,
        };
        let fired = evaluate(&m, true, true, &Thresholds::default(), &[]);
        assert_eq!(
            fired,
            vec![
                Flag::EntropyHigh,
                Flag::LongTokens,
                Flag::SymbolNoise,
                Flag::CompressHigh,
                Flag::MdlHigh,
                Flag::UniqHigh,
                Flag::EntropyJump,
                Flag::PeriodicityBias,
            ]
        );
    }

    #[test]
    fn test_severity_boundaries() {
        let thresholds = Thresholds::default();
        // 2 core + 1 aux = 2.5 -> Warning
        let warn = [Flag::EntropyHigh, Flag::MdlHigh, Flag::EntropyJump];
        let (sev, _) = aggregate(&warn, &thresholds).unwrap();
        assert_eq!(sev, Severity::Warning);

        // 3 core = 3.0 -> High
        let high = [Flag::EntropyHigh, Flag::MdlHigh, Flag::SymbolNoise];
        let (sev, _) = aggregate(&high, &thresholds).unwrap();
        assert_eq!(sev, Severity::High);

        // 2 core + 2 aux = 3.0 -> High
        let mixed = [
            Flag::EntropyHigh,
            Flag::MdlHigh,
            Flag::EntropyJump,
            Flag::StepExcess,
        ];
        let (sev, _) = aggregate(&mixed, &thresholds).unwrap();
        assert_eq!(sev, Severity::High);
    }

    #[test]
    fn test_no_flags_no_finding() {
        assert_eq!(aggregate(&[], &Thresholds::default()), None);
    }

    #[test]
    fn test_warning_floor_suppression() {
        let thresholds = Thresholds::default();
        // Single aux flag: score 0.3 < 1.0 -> suppressed
        assert_eq!(aggregate(&[Flag::EntropyJump], &thresholds), None);
        // Single core below the floor: 0.8 -> suppressed
        assert_eq!(aggregate(&[Flag::LongTokens], &thresholds), None);
        // Single core at exactly 1.0 -> kept
        let (sev, score) = aggregate(&[Flag::EntropyHigh], &thresholds).unwrap();
        assert_eq!(sev, Severity::Warning);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_high_never_suppressed() {
        let thresholds = Thresholds {
            score_floor: 10.0,
            ..Thresholds::default()
        };
        let high = [Flag::EntropyHigh, Flag::MdlHigh, Flag::SymbolNoise];
        let (sev, score) = aggregate(&high, &thresholds).unwrap();
        assert_eq!(sev, Severity::High);
        assert!(score < 10.0);
    }

    #[test]
    fn test_score_is_weighted_sum() {
        let thresholds = Thresholds::default();
        let fired = [Flag::EntropyHigh, Flag::CompressHigh, Flag::EntropyJump];
        let (_, score) = aggregate(&fired, &thresholds).unwrap();
        assert!((score - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_override_mapping() {
        let mut thresholds = Thresholds::default();
        thresholds.set_rule_threshold(Flag::EntropyHigh, 9.0);
        thresholds.set_rule_threshold(Flag::PeriodicityBias, 32.0);
        assert_eq!(thresholds.entropy_high, 9.0);
        assert_eq!(thresholds.positional_period, 32);
    }
}
