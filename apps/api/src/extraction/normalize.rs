//! Field normalizers: pure functions turning raw entry fragments into canonical fields.
//!
//! Every ambiguity resolves to a fixed default (medium difficulty, "General" topic,
//! no company) instead of an error.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::question::Difficulty;

/// Topic used when no keyword in the taxonomy matches.
pub const FALLBACK_TOPIC: &str = "General";

/// Added to an acceptance percentage before clamping into the frequency band.
const FREQUENCY_OFFSET: f64 = 25.0;
const FREQUENCY_MIN: f64 = 50.0;
const FREQUENCY_MAX: f64 = 95.0;

const PROBLEM_URL_BASE: &str = "https://leetcode.com/problems";

/// Fixed topic taxonomy. Keywords are lowercase and matched as substrings of the lowercased
/// entry text; topics are reported in table order.
const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("Array", &["array", "subarray", "sum", "product", "rotate"]),
    (
        "String",
        &["string", "substring", "palindrome", "anagram", "character", "word"],
    ),
    ("Hash Table", &["hash", "duplicate", "two sum", "anagram", "frequency"]),
    ("Linked List", &["linked list", "list node", "linked"]),
    ("Tree", &["tree", "binary", "bst", "traversal"]),
    (
        "Graph",
        &["graph", "island", "course", "network", "clone", "bfs", "dfs"],
    ),
    (
        "Dynamic Programming",
        &["dynamic", "subsequence", "climbing", "coin", "knapsack", "robber", "ways"],
    ),
    ("Binary Search", &["binary search", "search", "sorted", "rotated"]),
    ("Two Pointers", &["two pointer", "pointer", "container", "3sum", "trapping"]),
    ("Sliding Window", &["window", "longest substring", "consecutive"]),
    ("Stack", &["stack", "parenthes", "bracket", "valid"]),
    ("Heap", &["heap", "kth", "priority", "median", "top k"]),
    (
        "Backtracking",
        &["permutation", "combination", "subset", "backtrack", "queens", "sudoku"],
    ),
    ("Greedy", &["greedy", "jump", "interval", "meeting"]),
    ("Math", &["math", "number", "integer", "reverse", "power", "sqrt", "prime"]),
    ("Bit Manipulation", &["bit", "xor", "single number"]),
    ("Sorting", &["sort", "merge"]),
    ("Trie", &["trie", "prefix", "dictionary"]),
    ("Matrix", &["matrix", "grid", "spiral", "board"]),
    ("Design", &["design", "cache", "lru", "implement"]),
];

fn company_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^([a-z]+)-").unwrap())
}

fn acceptance_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").unwrap())
}

fn enumeration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+[.\s]+").unwrap())
}

/// Infers the company from a source filename like `google-Leetcode.pdf` → `Google`.
/// Only the final path segment is considered.
pub fn extract_company_name(filename: &str) -> Option<String> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let caps = company_re().captures(base)?;
    let name = caps.get(1)?.as_str();

    let mut chars = name.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Returns the first canonical difficulty word found, checked in Easy, Medium, Hard order.
pub fn find_difficulty(text: &str) -> Option<Difficulty> {
    [
        ("Easy", Difficulty::Easy),
        ("Medium", Difficulty::Medium),
        ("Hard", Difficulty::Hard),
    ]
    .into_iter()
    .find(|(word, _)| text.contains(word))
    .map(|(_, difficulty)| difficulty)
}

pub fn parse_difficulty(text: &str) -> Difficulty {
    find_difficulty(text).unwrap_or_default()
}

pub fn contains_difficulty(text: &str) -> bool {
    find_difficulty(text).is_some()
}

/// First `<number>%` in the text, clamped to [0, 100].
pub fn parse_acceptance(text: &str) -> Option<f64> {
    let caps = acceptance_re().captures(text)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(value.clamp(0.0, 100.0))
}

/// Maps an acceptance rate onto the 50–95 "asked frequency" band.
pub fn frequency_from_acceptance(acceptance: f64) -> u32 {
    (acceptance + FREQUENCY_OFFSET)
        .clamp(FREQUENCY_MIN, FREQUENCY_MAX)
        .round() as u32
}

/// Frequency for a text fragment carrying an acceptance percentage, or `default` without one.
pub fn parse_frequency(text: &str, default: u32) -> u32 {
    parse_acceptance(text)
        .map(frequency_from_acceptance)
        .unwrap_or(default)
}

/// Multi-label topic tagging against the fixed taxonomy. Never returns an empty list.
pub fn extract_topics(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let topics: Vec<String> = TOPIC_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|(topic, _)| topic.to_string())
        .collect();

    if topics.is_empty() {
        vec![FALLBACK_TOPIC.to_string()]
    } else {
        topics
    }
}

/// Strips a leading enumeration (`12.` / `12 `) and collapses whitespace.
pub fn clean_title(raw: &str) -> String {
    let stripped = enumeration_re().replace(raw.trim(), "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased title with whitespace runs replaced by single hyphens.
pub fn title_slug(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Picks the record id: captured reference slug, then title slug, then `problem-<ordinal>`.
pub fn derive_id(reference: Option<&str>, title: Option<&str>, ordinal: usize) -> String {
    if let Some(reference) = reference.filter(|r| !r.is_empty()) {
        return reference.to_string();
    }
    match title.map(title_slug) {
        Some(slug) if !slug.is_empty() => slug,
        _ => format!("problem-{ordinal}"),
    }
}

pub fn problem_url(reference: &str) -> String {
    format!("{PROBLEM_URL_BASE}/{reference}/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_from_filename() {
        assert_eq!(
            extract_company_name("google-Leetcode.pdf").as_deref(),
            Some("Google")
        );
        assert_eq!(
            extract_company_name("uploads/amazon-2024.pdf").as_deref(),
            Some("Amazon")
        );
    }

    #[test]
    fn test_company_missing_for_unprefixed_filename() {
        assert_eq!(extract_company_name("randomfile.pdf"), None);
        assert_eq!(extract_company_name("-leading-dash.pdf"), None);
    }

    #[test]
    fn test_difficulty_first_match_wins() {
        assert_eq!(parse_difficulty("Accepted 45% Medium"), Difficulty::Medium);
        assert_eq!(parse_difficulty("Hard then Easy"), Difficulty::Easy);
        assert_eq!(parse_difficulty("HARD"), Difficulty::Medium);
    }

    #[test]
    fn test_difficulty_defaults_to_medium() {
        assert_eq!(parse_difficulty("no hint here"), Difficulty::Medium);
        assert!(!contains_difficulty("no hint here"));
    }

    #[test]
    fn test_frequency_band() {
        assert_eq!(parse_frequency("10%", 0), 50);
        assert_eq!(parse_frequency("80%", 0), 95);
        assert_eq!(parse_frequency("40%", 0), 65);
        assert_eq!(parse_frequency("45.2%", 0), 70);
    }

    #[test]
    fn test_frequency_without_percentage_uses_default() {
        assert_eq!(parse_frequency("Medium", 42), 42);
    }

    #[test]
    fn test_acceptance_is_clamped() {
        assert_eq!(parse_acceptance("150%"), Some(100.0));
        assert_eq!(parse_acceptance("33.8 %"), Some(33.8));
        assert_eq!(parse_acceptance("no rate"), None);
    }

    #[test]
    fn test_topics_include_tree() {
        let topics = extract_topics("binary search tree traversal");
        assert!(topics.contains(&"Tree".to_string()));
        assert!(topics.contains(&"Binary Search".to_string()));
    }

    #[test]
    fn test_topics_fall_back_to_general() {
        assert_eq!(extract_topics("Excel quirks"), vec!["General"]);
    }

    #[test]
    fn test_topics_are_case_insensitive_and_unique() {
        let topics = extract_topics("Reverse LINKED LIST linked list");
        assert_eq!(
            topics.iter().filter(|t| t.as_str() == "Linked List").count(),
            1
        );
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("12.  Two   Sum "), "Two Sum");
        assert_eq!(clean_title("3 Longest Substring"), "Longest Substring");
        assert_eq!(clean_title("3Sum"), "3Sum");
    }

    #[test]
    fn test_derive_id_precedence() {
        assert_eq!(derive_id(Some("two-sum"), Some("Two Sum"), 1), "two-sum");
        assert_eq!(derive_id(None, Some("Two  Sum"), 1), "two-sum");
        assert_eq!(derive_id(None, None, 7), "problem-7");
    }
}
