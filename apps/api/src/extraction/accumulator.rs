//! Entry accumulator: folds classified lines into raw entries.
//!
//! The fold state is either `Idle` or `Accumulating(PartialEntry)`. Each line is matched
//! against `RULES` in order; the first rule that applies produces the next state and,
//! when an entry is closed, the flushed `RawEntry`. Lines no rule applies to are dropped.
//! Malformed input only ever yields fewer or less complete entries.

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use crate::extraction::classifier::{classify_line, LineClass};
use crate::extraction::normalize::{find_difficulty, parse_acceptance};
use crate::models::question::Difficulty;

/// What to do with unclassified lines that follow an open entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContinuationPolicy {
    /// Keep the provisional title as-is.
    #[default]
    Ignore,
    /// Append the line to the provisional title with a single space.
    Append,
}

/// In-progress entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialEntry {
    pub title: String,
    pub reference: Option<String>,
    pub acceptance: Option<f64>,
    pub difficulty: Option<Difficulty>,
    /// Set when the whole row parsed from its first line.
    pub single_line: bool,
    /// Every consumed line, space-joined. Used for topic tagging.
    pub text: String,
}

/// A closed entry, ready for field normalization.
pub type RawEntry = PartialEntry;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum AccumulatorState {
    #[default]
    Idle,
    Accumulating(PartialEntry),
}

impl AccumulatorState {
    /// Closes the open entry, if it has a title.
    pub fn flush(self) -> Option<RawEntry> {
        match self {
            AccumulatorState::Accumulating(entry) if !entry.title.trim().is_empty() => Some(entry),
            _ => None,
        }
    }

    fn is_accumulating(&self) -> bool {
        matches!(self, AccumulatorState::Accumulating(_))
    }
}

/// Result of applying one rule: next state plus any entry it closed.
pub type Transition = (AccumulatorState, Option<RawEntry>);

/// An ordered `(predicate, action)` pair.
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&LineClass<'_>, &AccumulatorState) -> bool,
    pub apply: fn(AccumulatorState, &LineClass<'_>, &str, ContinuationPolicy) -> Transition,
}

pub const RULES: &[Rule] = &[
    Rule {
        name: "entry-start",
        applies: is_entry_start,
        apply: open_entry,
    },
    Rule {
        name: "metadata",
        applies: is_open_metadata,
        apply: merge_metadata,
    },
    Rule {
        name: "difficulty",
        applies: is_open_difficulty,
        apply: merge_metadata,
    },
    Rule {
        name: "continuation",
        applies: is_open_continuation,
        apply: continue_title,
    },
];

fn is_entry_start(class: &LineClass<'_>, _state: &AccumulatorState) -> bool {
    matches!(class, LineClass::EntryStart { .. })
}

fn is_open_metadata(class: &LineClass<'_>, state: &AccumulatorState) -> bool {
    matches!(class, LineClass::MetadataOnly) && state.is_accumulating()
}

fn is_open_difficulty(class: &LineClass<'_>, state: &AccumulatorState) -> bool {
    matches!(class, LineClass::DifficultyOnly) && state.is_accumulating()
}

fn is_open_continuation(class: &LineClass<'_>, state: &AccumulatorState) -> bool {
    matches!(class, LineClass::Unclassified) && state.is_accumulating()
}

fn single_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<title>.+?)\s+(?:\((?P<reference>[a-z0-9]+(?:-[a-z0-9]+)*)\)\s+)?(?P<acceptance>\d+(?:\.\d+)?)\s*%(?:\s+(?P<difficulty>Easy|Medium|Hard))?\s*$",
        )
        .unwrap()
    })
}

/// Parses `<title> [(<reference>)] <acceptance>% [difficulty]` from one row.
pub fn parse_single_line(rest: &str) -> Option<PartialEntry> {
    let caps = single_line_re().captures(rest.trim())?;
    let title = caps.name("title")?.as_str().trim().to_string();
    let acceptance = caps
        .name("acceptance")
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|a| a.clamp(0.0, 100.0));

    Some(PartialEntry {
        title,
        reference: caps.name("reference").map(|m| m.as_str().to_string()),
        acceptance,
        difficulty: caps
            .name("difficulty")
            .and_then(|m| find_difficulty(m.as_str())),
        single_line: true,
        text: rest.trim().to_string(),
    })
}

fn open_entry(
    state: AccumulatorState,
    class: &LineClass<'_>,
    _line: &str,
    _policy: ContinuationPolicy,
) -> Transition {
    let rest = match class {
        LineClass::EntryStart { rest } => *rest,
        _ => return (state, None),
    };
    let flushed = state.flush();
    let entry = parse_single_line(rest).unwrap_or_else(|| PartialEntry {
        title: rest.to_string(),
        text: rest.to_string(),
        ..PartialEntry::default()
    });
    (AccumulatorState::Accumulating(entry), flushed)
}

fn merge_metadata(
    state: AccumulatorState,
    _class: &LineClass<'_>,
    line: &str,
    _policy: ContinuationPolicy,
) -> Transition {
    let mut entry = match state {
        AccumulatorState::Accumulating(entry) => entry,
        idle => return (idle, None),
    };
    if let Some(acceptance) = parse_acceptance(line) {
        entry.acceptance = Some(acceptance);
    }
    if let Some(difficulty) = find_difficulty(line) {
        entry.difficulty = Some(difficulty);
    }
    push_text(&mut entry.text, line);
    (AccumulatorState::Accumulating(entry), None)
}

fn continue_title(
    state: AccumulatorState,
    _class: &LineClass<'_>,
    line: &str,
    policy: ContinuationPolicy,
) -> Transition {
    let mut entry = match state {
        AccumulatorState::Accumulating(entry) => entry,
        idle => return (idle, None),
    };
    if policy == ContinuationPolicy::Append {
        push_text(&mut entry.title, line);
        push_text(&mut entry.text, line);
    }
    (AccumulatorState::Accumulating(entry), None)
}

fn push_text(target: &mut String, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(line);
}

/// Applies the first matching rule to one line.
pub fn step(state: AccumulatorState, line: &str, policy: ContinuationPolicy) -> Transition {
    let class = classify_line(line);
    match RULES.iter().find(|rule| (rule.applies)(&class, &state)) {
        Some(rule) => {
            trace!(rule = rule.name, "Applying accumulator rule");
            (rule.apply)(state, &class, line.trim(), policy)
        }
        None => (state, None),
    }
}

/// Folds all lines of a document into raw entries, in input order.
pub fn accumulate<'a, I>(lines: I, policy: ContinuationPolicy) -> Vec<RawEntry>
where
    I: IntoIterator<Item = &'a str>,
{
    let (state, mut entries) = lines.into_iter().fold(
        (AccumulatorState::Idle, Vec::new()),
        |(state, mut entries), line| {
            let (next, flushed) = step(state, line, policy);
            entries.extend(flushed);
            (next, entries)
        },
    );
    entries.extend(state.flush());
    entries
}
