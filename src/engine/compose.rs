//! Finding message composition
//!
//! Each flag carries a fixed explanation, a short example of the
//! pattern, and a remediation hint. Messages are assembled from these
//! triples in canonical flag order, so identical flag sets always
//! produce identical text.

use crate::models::Flag;

/// Fixed descriptive strings for one flag.
#[derive(Debug, Clone, Copy)]
pub struct FlagInfo {
    pub explanation: &'static str,
    pub example: &'static str,
    pub remediation: &'static str,
}

/// Descriptive triple for a flag. Also feeds SARIF rule metadata.
pub fn flag_info(flag: Flag) -> FlagInfo {
    match flag {
        Flag::EntropyHigh => FlagInfo {
            explanation: "character diversity is unusually high for prose",
            example: "qXz7#vKp9@mW4$tR2&nY8",
            remediation: "rewrite in plain words; move encoded data out of the sentence",
        },
        Flag::LongTokens => FlagInfo {
            explanation: "average token length is far above normal vocabulary",
            example: "operationalization interoperabilities",
            remediation: "prefer short, concrete words over stacked nominalizations",
        },
        Flag::SymbolNoise => FlagInfo {
            explanation: "punctuation and symbols crowd out the words",
            example: "=> {...} // @#!",
            remediation: "move code or markup into a fenced block and keep the line textual",
        },
        Flag::CompressHigh => FlagInfo {
            explanation: "the line has almost no repeated structure to compress",
            example: "zqwxcvbnmasdfghjklpoiuytre",
            remediation: "break the line up; dense incompressible runs read as filler",
        },
        Flag::MdlHigh => FlagInfo {
            explanation: "description length stays high after modeling",
            example: "h8Kq2mZv0xWn5rTy1pLb6",
            remediation: "replace opaque identifiers with names a reader can parse",
        },
        Flag::UniqHigh => FlagInfo {
            explanation: "almost every token appears exactly once",
            example: "alpha bravo charlie delta echo foxtrot golf hotel india juliett kilo lima mike november oscar",
            remediation: "repetition is natural; let key terms recur instead of synonym-cycling",
        },
        Flag::EntropyJump => FlagInfo {
            explanation: "character diversity spikes sharply against the previous line",
            example: "plain intro line, then: kQ93#xZv!7mW@4tR",
            remediation: "smooth the transition or separate the dense material into its own block",
        },
        Flag::StepExcess => FlagInfo {
            explanation: "step markers outnumber what the line's length supports",
            example: "Step 1 step 2 step 3 step 4 first second third",
            remediation: "fold micro-steps into real sentences or a numbered list",
        },
        Flag::PeriodicityBias => FlagInfo {
            explanation: "the line sits on a generation-window boundary",
            example: "(line index is a multiple of 64)",
            remediation: "none on its own; review the accompanying signals",
        },
    }
}

/// Compose the finding message for a set of fired flags.
///
/// One segment per flag, canonical order, joined with "; ".
pub fn compose_message(flags: &[Flag]) -> String {
    let segments: Vec<String> = flags
        .iter()
        .map(|&flag| {
            let info = flag_info(flag);
            format!(
                "{}: {} (e.g. \"{}\"). Fix: {}",
                flag.name(),
                info.explanation,
                info.example,
                info.remediation
            )
        })
        .collect();
    segments.join("; ")
}
