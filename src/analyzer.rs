//! File and directory analysis
//!
//! The engine scores text; this module feeds it files. It walks
//! directories with gitignore support, reads files leniently (invalid
//! UTF-8 is replaced, never fatal), applies inline suppression
//! markers, and assembles per-file reports into an [`AnalysisReport`].

use crate::config::ProjectConfig;
use crate::engine::Engine;
use crate::models::{deterministic_finding_id, AnalysisReport, FileReport, Finding};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extensions treated as prose.
pub const PROSE_EXTENSIONS: &[&str] = &[
    "md", "markdown", "mdx", "txt", "text", "prompt", "rst", "adoc",
];

/// The seam hosts integrate against: full text in, findings out.
///
/// Editors and CI wrappers that hold text in memory implement against
/// this rather than the filesystem entry points.
pub trait TextAnalyzer {
    fn analyze(&self, text: &str) -> Vec<Finding>;
}

impl TextAnalyzer for Engine {
    fn analyze(&self, text: &str) -> Vec<Finding> {
        Engine::analyze(self, text)
    }
}

/// Check if a line carries a linestrain suppression marker
///
/// Supports multiple comment styles:
/// - `<!-- linestrain: ignore -->` (Markdown, HTML)
/// - `# linestrain: ignore` (plain text conventions)
/// - `// linestrain: ignore`
/// - `.. linestrain: ignore` (reStructuredText)
///
/// The marker suppresses the line it sits on, or the following line
/// when it stands alone in a comment.
pub fn is_line_suppressed(line: &str, prev_line: Option<&str>) -> bool {
    let marker = "linestrain: ignore";
    let marker_alt = "linestrain:ignore";

    let line_lower = line.to_lowercase();
    if line_lower.contains(marker) || line_lower.contains(marker_alt) {
        return true;
    }

    if let Some(prev) = prev_line {
        let prev_lower = prev.trim().to_lowercase();
        if (prev_lower.starts_with("<!--")
            || prev_lower.starts_with("//")
            || prev_lower.starts_with('#')
            || prev_lower.starts_with(".."))
            && (prev_lower.contains(marker) || prev_lower.contains(marker_alt))
        {
            return true;
        }
    }

    false
}

/// Walk prose files under a root, honoring `.gitignore` and
/// `.linestrainignore` files.
pub fn walk_prose_files(root: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    use ignore::WalkBuilder;

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .require_git(false)
        .add_custom_ignore_filename(".linestrainignore");

    builder.build().filter_map(move |entry| {
        let entry = entry.ok()?;
        let path = entry.path();

        if !path.is_file() {
            return None;
        }

        let ext = path.extension()?.to_str()?;
        if !PROSE_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
            return None;
        }

        Some(path.to_path_buf())
    })
}

/// Analyze one file: run the engine, drop suppressed lines, attach the
/// path and stable IDs.
pub fn analyze_file(engine: &Engine, path: &Path) -> Result<FileReport> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();

    let path_str = path.to_string_lossy();
    let findings: Vec<Finding> = engine
        .analyze(&text)
        .into_iter()
        .filter(|f| {
            let idx = f.line as usize;
            let line = lines.get(idx).copied().unwrap_or("");
            let prev = idx.checked_sub(1).and_then(|i| lines.get(i).copied());
            !is_line_suppressed(line, prev)
        })
        .map(|mut f| {
            f.id = deterministic_finding_id(&path_str, f.line, &f.flag_list());
            f.file = Some(path.to_path_buf());
            f
        })
        .collect();

    debug!(
        file = %path.display(),
        lines = lines.len(),
        findings = findings.len(),
        "analyzed file"
    );

    Ok(FileReport {
        path: path.to_path_buf(),
        lines_scanned: lines.len(),
        findings,
    })
}

/// Analyze a batch of files in parallel. Unreadable files are skipped
/// with a warning; file order is preserved.
pub fn analyze_files(engine: &Engine, files: &[PathBuf]) -> Vec<FileReport> {
    files
        .par_iter()
        .filter_map(|path| match analyze_file(engine, path) {
            Ok(report) => Some(report),
            Err(err) => {
                warn!("skipping {}: {err:#}", path.display());
                None
            }
        })
        .collect()
}

/// Analyze a file or directory tree into a full report.
///
/// A file path is analyzed regardless of extension; a directory is
/// walked for prose files, minus the config's excluded paths.
pub fn analyze_path(
    engine: &Engine,
    path: &Path,
    config: &ProjectConfig,
) -> Result<AnalysisReport> {
    if path.is_file() {
        let report = analyze_file(engine, path)?;
        return Ok(AnalysisReport::from_files(vec![report]));
    }

    let mut files: Vec<PathBuf> = walk_prose_files(path)
        .filter(|p| !config.should_exclude(p))
        .collect();
    files.sort();

    Ok(AnalysisReport::from_files(analyze_files(engine, &files)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const NOISY: &str = "qXz7#vKp9@mW4$tR2&nY8%uJ5!hB3^dF6(gs1)zQ0+eL~cV";

    #[test]
    fn test_suppression_inline() {
        assert!(is_line_suppressed("bad line <!-- linestrain: ignore -->", None));
        assert!(is_line_suppressed("bad line linestrain:ignore", None));
        assert!(!is_line_suppressed("an ordinary line", None));
    }

    #[test]
    fn test_suppression_previous_comment() {
        assert!(is_line_suppressed(
            "bad line",
            Some("<!-- linestrain: ignore -->")
        ));
        assert!(is_line_suppressed("bad line", Some("# linestrain: ignore")));
        assert!(is_line_suppressed("bad line", Some(".. linestrain: ignore")));
        // Marker embedded in running prose does not suppress
        assert!(!is_line_suppressed(
            "bad line",
            Some("we mention linestrain: ignore here in passing")
        ));
    }

    #[test]
    fn test_analyze_file_attaches_path_and_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "an ordinary opening line").unwrap();
        writeln!(f, "{NOISY}").unwrap();

        let report = analyze_file(&Engine::new(), &path).unwrap();
        assert_eq!(report.lines_scanned, 2);
        assert_eq!(report.findings.len(), 1);
        let finding = &report.findings[0];
        assert_eq!(finding.file.as_deref(), Some(path.as_path()));
        assert_eq!(finding.id.len(), 16);
        assert_eq!(finding.line, 1);
    }

    #[test]
    fn test_suppressed_line_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "<!-- linestrain: ignore -->").unwrap();
        writeln!(f, "{NOISY}").unwrap();

        let report = analyze_file(&Engine::new(), &path).unwrap();
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_walk_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "hello").unwrap();
        fs::write(dir.path().join("b.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("c.txt"), "hello").unwrap();

        let mut found: Vec<String> = walk_prose_files(dir.path())
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        found.sort();
        assert_eq!(found, vec!["a.md", "c.txt"]);
    }

    #[test]
    fn test_analyze_path_on_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("clean.md"), "short note\n").unwrap();
        fs::write(dir.path().join("noisy.md"), format!("{NOISY}\n")).unwrap();

        let report =
            analyze_path(&Engine::new(), dir.path(), &ProjectConfig::default()).unwrap();
        assert_eq!(report.total_files, 2);
        assert_eq!(report.findings_summary.total, 1);
        assert!(report.overall_score < 100.0);
    }

    #[test]
    fn test_analyze_path_respects_excludes() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("vendor")).unwrap();
        fs::write(dir.path().join("vendor/noisy.md"), format!("{NOISY}\n")).unwrap();

        let mut config = ProjectConfig::default();
        config.exclude.paths.push("**/vendor/**".to_string());
        let report = analyze_path(&Engine::new(), dir.path(), &config).unwrap();
        assert_eq!(report.total_files, 0);
    }
}
