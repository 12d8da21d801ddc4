//! Line normalization
//!
//! Strips markdown furniture before metric extraction so that link
//! targets, emphasis markers, and template placeholders do not skew
//! the character statistics. Normalization never fails: unbalanced
//! constructs pass through unchanged.

use regex::Regex;
use std::sync::OnceLock;

/// Replacement for template placeholders. Uppercase so it reads as an
/// ordinary token, not punctuation, in downstream metrics.
pub const PLACEHOLDER_MARKER: &str = "VAR";

static LINK_PATTERN: OnceLock<Regex> = OnceLock::new();
static DOUBLE_BRACE_PATTERN: OnceLock<Regex> = OnceLock::new();
static SINGLE_BRACE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn link_pattern() -> &'static Regex {
    LINK_PATTERN.get_or_init(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("valid regex"))
}

fn double_brace_pattern() -> &'static Regex {
    DOUBLE_BRACE_PATTERN.get_or_init(|| Regex::new(r"\{\{[^{}]*\}\}").expect("valid regex"))
}

fn single_brace_pattern() -> &'static Regex {
    SINGLE_BRACE_PATTERN.get_or_init(|| Regex::new(r"\{[^{}]*\}").expect("valid regex"))
}

/// Normalize one raw line for metric extraction.
///
/// Applied in order: markdown links collapse to their label, emphasis
/// markers are removed, template placeholders become
/// [`PLACEHOLDER_MARKER`]. Images degrade to their alt text with a
/// stray leading `!`, which is fine for character statistics.
pub fn normalize_line(raw: &str) -> String {
    let line = link_pattern().replace_all(raw, "$1");
    // Single `_` stays: it is a word character in identifiers like
    // `snake_case`.
    let line = line.replace("__", "").replace('*', "").replace('`', "");
    // `{{name}}` first so it collapses to one marker, then `{name}`.
    let line = double_brace_pattern().replace_all(&line, PLACEHOLDER_MARKER);
    let line = single_brace_pattern().replace_all(&line, PLACEHOLDER_MARKER);
    line.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_collapses_to_label() {
        assert_eq!(
            normalize_line("see [the docs](https://example.com/a/b) for details"),
            "see the docs for details"
        );
    }

    #[test]
    fn test_image_keeps_alt_text() {
        assert_eq!(normalize_line("![diagram](img/x.png)"), "!diagram");
    }

    #[test]
    fn test_empty_label_link() {
        assert_eq!(normalize_line("[](http://x)"), "");
    }

    #[test]
    fn test_emphasis_stripped() {
        assert_eq!(normalize_line("**bold** and *em* and `code`"), "bold and em and code");
    }

    #[test]
    fn test_single_underscore_survives() {
        assert_eq!(normalize_line("__dunder__ snake_case"), "dunder snake_case");
    }

    #[test]
    fn test_placeholders_become_marker() {
        assert_eq!(normalize_line("run {cmd} on {{host}}"), "run VAR on VAR");
    }

    #[test]
    fn test_unbalanced_left_alone() {
        assert_eq!(normalize_line("[label( and {open"), "[label( and {open");
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(normalize_line(""), "");
    }

    #[test]
    fn test_pure_emphasis_line_goes_blank() {
        assert_eq!(normalize_line("*** ** `"), "  ");
    }
}
