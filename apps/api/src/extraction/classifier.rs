//! Line classifier: labels a single line of layout-derived text.

use std::sync::OnceLock;

use regex::Regex;

use crate::extraction::normalize::contains_difficulty;

/// Label for one trimmed line. `EntryStart` borrows the text after the row number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// Blank lines and table header/footer boilerplate.
    Noise,
    EntryStart { rest: &'a str },
    /// Acceptance (and possibly difficulty) trailing the previous entry.
    MetadataOnly,
    DifficultyOnly,
    Unclassified,
}

fn entry_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\s+(\S.*)$").unwrap())
}

fn is_noise(line: &str) -> bool {
    line.is_empty()
        || line.contains("Title")
        || line.contains("Acceptance")
        || line.starts_with("Show")
}

/// Classifies a line. Checks run in priority order: noise, entry start, metadata, difficulty.
pub fn classify_line(line: &str) -> LineClass<'_> {
    let line = line.trim();

    if is_noise(line) {
        return LineClass::Noise;
    }
    if let Some(rest) = entry_start_re()
        .captures(line)
        .and_then(|caps| caps.get(1))
    {
        return LineClass::EntryStart {
            rest: rest.as_str(),
        };
    }
    if line.contains('%') {
        return LineClass::MetadataOnly;
    }
    if contains_difficulty(line) {
        return LineClass::DifficultyOnly;
    }
    LineClass::Unclassified
}
