//! Per-line prose strain scoring.
//!
//! Linestrain reads text line by line, computes a bundle of statistical
//! metrics per line (entropy, token shape, compressibility), and flags
//! lines that look like machine-generated filler.
//!
//! ```
//! use linestrain::Engine;
//!
//! let engine = Engine::new();
//! let findings = engine.analyze("short note\n");
//! assert!(findings.is_empty());
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod engine;
pub mod models;
pub mod reporters;

pub use analyzer::{analyze_file, analyze_path, TextAnalyzer};
pub use engine::{Engine, EngineConfig};
pub use models::{AnalysisReport, FileReport, Finding, Flag, Severity};
