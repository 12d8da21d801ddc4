//! Per-line metric extraction
//!
//! Every metric is computed from the normalized line. All counts are
//! over Unicode scalar values (`char`), not bytes. Tokens are maximal
//! runs of alphanumeric or underscore chars.

use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::OnceLock;

static STEP_PATTERN: OnceLock<Regex> = OnceLock::new();
static ORDINAL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn step_pattern() -> &'static Regex {
    STEP_PATTERN.get_or_init(|| Regex::new(r"(?i)\bstep\s*\d+\b").expect("valid regex"))
}

fn ordinal_pattern() -> &'static Regex {
    ORDINAL_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth)\b")
            .expect("valid regex")
    })
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Statistical profile of one normalized line.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineMetrics {
    pub char_count: usize,
    pub token_count: usize,
    /// Shannon entropy in bits over the character distribution.
    pub entropy: f64,
    pub avg_token_len: f64,
    pub unique_token_ratio: f64,
    pub symbol_density: f64,
    pub case_switch_rate: f64,
    /// Run-length-encoding proxy: encoded units / original chars.
    pub compression_ratio: f64,
    /// Minimum-description-length proxy. Tracks the entropy value but
    /// is thresholded independently.
    pub mdl_ratio: f64,
    pub step_count: usize,
}

impl LineMetrics {
    pub fn compute(normalized: &str) -> Self {
        let chars: Vec<char> = normalized.chars().collect();
        let char_count = chars.len();

        let tokens: Vec<&str> = normalized
            .split(|c: char| !is_token_char(c))
            .filter(|t| !t.is_empty())
            .collect();
        let token_count = tokens.len();

        let entropy = shannon_entropy(&chars);

        let avg_token_len = if token_count == 0 {
            0.0
        } else {
            let total: usize = tokens.iter().map(|t| t.chars().count()).sum();
            total as f64 / token_count as f64
        };

        let unique_token_ratio = if token_count == 0 {
            0.0
        } else {
            let distinct: FxHashSet<&str> = tokens.iter().copied().collect();
            distinct.len() as f64 / token_count as f64
        };

        let symbol_density = if char_count == 0 {
            0.0
        } else {
            let symbols = chars
                .iter()
                .filter(|c| !c.is_alphanumeric() && **c != '_' && !c.is_whitespace())
                .count();
            symbols as f64 / char_count as f64
        };

        let case_switch_rate = case_switch_rate(&chars);
        let compression_ratio = rle_ratio(&chars);

        let step_count = step_pattern().find_iter(normalized).count()
            + ordinal_pattern().find_iter(normalized).count();

        Self {
            char_count,
            token_count,
            entropy,
            avg_token_len,
            unique_token_ratio,
            symbol_density,
            case_switch_rate,
            compression_ratio,
            mdl_ratio: entropy,
            step_count,
        }
    }
}

/// Shannon entropy in bits over the character distribution.
/// Empty input yields 0.0.
fn shannon_entropy(chars: &[char]) -> f64 {
    if chars.is_empty() {
        return 0.0;
    }
    let mut counts: FxHashMap<char, usize> = FxHashMap::default();
    for c in chars {
        *counts.entry(*c).or_insert(0) += 1;
    }
    let total = chars.len() as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Upper/lower transitions among consecutive alphabetic chars, divided
/// by (alphabetic count - 1). Caseless alphabetic chars break no runs
/// but count toward the denominator.
fn case_switch_rate(chars: &[char]) -> f64 {
    let cases: Vec<Option<bool>> = chars
        .iter()
        .filter(|c| c.is_alphabetic())
        .map(|c| {
            if c.is_uppercase() {
                Some(true)
            } else if c.is_lowercase() {
                Some(false)
            } else {
                None
            }
        })
        .collect();
    if cases.len() < 2 {
        return 0.0;
    }
    let switches = cases
        .windows(2)
        .filter(|w| matches!((w[0], w[1]), (Some(a), Some(b)) if a != b))
        .count();
    switches as f64 / (cases.len() - 1) as f64
}

/// Run-length-encoding size proxy. Each run contributes one unit, plus
/// one extra unit for the count when the run is longer than one char.
/// Empty input yields 0.0.
fn rle_ratio(chars: &[char]) -> f64 {
    if chars.is_empty() {
        return 0.0;
    }
    let mut units = 0usize;
    let mut run_char = chars[0];
    let mut run_len = 1usize;
    for &c in &chars[1..] {
        if c == run_char {
            run_len += 1;
        } else {
            units += if run_len > 1 { 2 } else { 1 };
            run_char = c;
            run_len = 1;
        }
    }
    units += if run_len > 1 { 2 } else { 1 };
    units as f64 / chars.len() as f64
}
