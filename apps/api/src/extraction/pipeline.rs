//! Document → questions orchestration.
//!
//! `extract_questions` is pure and deterministic in `(text, filename, options)`, so callers may
//! run documents concurrently and memoize by document identity. `extract_document` wraps it
//! with the whole-document failure contract: a failure becomes an outcome with
//! `success: false` and no questions, never an error crossing the boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::accumulator::{accumulate, ContinuationPolicy, RawEntry};
use crate::extraction::normalize::{
    clean_title, derive_id, extract_company_name, extract_topics, frequency_from_acceptance,
    parse_acceptance, parse_difficulty, parse_frequency, problem_url,
};
use crate::extraction::stats::{compute_statistics, StatisticsSummary};
use crate::models::question::ExtractedQuestion;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("document contains no extractable text")]
    EmptyDocument,

    #[error("failed to decode document: {0}")]
    Decode(String),

    #[error("failed to fetch document: {0}")]
    Fetch(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Frequency assigned when an entry has no acceptance rate.
    pub default_frequency: u32,
    pub continuation: ContinuationPolicy,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            default_frequency: 50,
            continuation: ContinuationPolicy::Ignore,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentInput {
    pub text: String,
    #[serde(default)]
    pub filename: String,
}

/// Per-document result, shared by the single and batch entry points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub success: bool,
    pub filename: String,
    pub company: Option<String>,
    pub questions: Vec<ExtractedQuestion>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<StatisticsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionOutcome {
    pub fn succeeded(filename: &str, questions: Vec<ExtractedQuestion>) -> Self {
        Self {
            success: true,
            filename: filename.to_string(),
            company: extract_company_name(filename),
            count: questions.len(),
            statistics: Some(compute_statistics(&questions)),
            questions,
            error: None,
        }
    }

    pub fn failed(filename: &str, error: impl ToString) -> Self {
        Self {
            success: false,
            filename: filename.to_string(),
            company: extract_company_name(filename),
            questions: Vec::new(),
            count: 0,
            statistics: None,
            error: Some(error.to_string()),
        }
    }
}

/// Extracts every question row from already-decoded document text, in input order.
pub fn extract_questions(
    text: &str,
    filename: &str,
    options: &ExtractOptions,
) -> Vec<ExtractedQuestion> {
    let company = extract_company_name(filename).unwrap_or_default();
    let entries = accumulate(text.lines(), options.continuation);
    let total = entries.len();

    let questions: Vec<ExtractedQuestion> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| normalize_entry(entry, i + 1, &company, options))
        .collect();

    debug!(
        filename,
        entries = total,
        questions = questions.len(),
        "Extracted questions from document"
    );
    questions
}

fn normalize_entry(
    entry: RawEntry,
    ordinal: usize,
    company: &str,
    options: &ExtractOptions,
) -> Option<ExtractedQuestion> {
    let title = clean_title(&entry.title);
    if title.is_empty() {
        return None;
    }

    let id = derive_id(
        entry.reference.as_deref(),
        entry.single_line.then_some(title.as_str()),
        ordinal,
    );
    let url = entry
        .reference
        .as_deref()
        .map(problem_url)
        .unwrap_or_default();

    Some(ExtractedQuestion {
        id,
        difficulty: entry
            .difficulty
            .unwrap_or_else(|| parse_difficulty(&entry.text)),
        // Rows the single-line grammar rejected may still carry a percentage in their text.
        frequency: match entry.acceptance {
            Some(acceptance) => frequency_from_acceptance(acceptance),
            None => parse_frequency(&entry.text, options.default_frequency),
        },
        topics: extract_topics(&entry.text),
        company: company.to_string(),
        acceptance: entry
            .acceptance
            .or_else(|| parse_acceptance(&entry.text))
            .unwrap_or(0.0),
        url,
        title,
    })
}

/// Extracts one document, reporting unusable text as a failed outcome.
pub fn extract_document(text: &str, filename: &str, options: &ExtractOptions) -> ExtractionOutcome {
    if text.trim().is_empty() {
        warn!(filename, "Document has no extractable text");
        return ExtractionOutcome::failed(filename, ExtractionError::EmptyDocument);
    }
    ExtractionOutcome::succeeded(filename, extract_questions(text, filename, options))
}

/// Sequential batch extraction. Each item succeeds or fails on its own.
pub fn extract_batch(documents: &[DocumentInput], options: &ExtractOptions) -> Vec<ExtractionOutcome> {
    documents
        .iter()
        .map(|doc| extract_document(&doc.text, &doc.filename, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Difficulty;

    const TWO_ROWS: &str = "\
1 Two Sum (two-sum) 45.2% Easy
2 Reverse Linked List (reverse-linked-list) 65.0% Medium";

    #[test]
    fn test_two_single_line_rows() {
        let questions = extract_questions(TWO_ROWS, "google-Leetcode.pdf", &ExtractOptions::default());
        assert_eq!(questions.len(), 2);

        assert_eq!(questions[0].id, "two-sum");
        assert_eq!(questions[0].title, "Two Sum");
        assert_eq!(questions[0].difficulty, Difficulty::Easy);
        assert_eq!(questions[0].frequency, 70);
        assert_eq!(questions[0].company, "Google");
        assert!((questions[0].acceptance - 45.2).abs() < f64::EPSILON);
        assert_eq!(questions[0].url, "https://leetcode.com/problems/two-sum/");

        assert_eq!(questions[1].id, "reverse-linked-list");
        assert_eq!(questions[1].difficulty, Difficulty::Medium);
        assert_eq!(questions[1].frequency, 90);
        assert!(questions[1].topics.contains(&"Linked List".to_string()));
    }

    #[test]
    fn test_multi_line_row_gets_ordinal_id_and_default_frequency() {
        let text = "\
Title Acceptance Difficulty
1 Serialize and Deserialize
Binary Tree
Hard";
        let options = ExtractOptions {
            default_frequency: 61,
            ..ExtractOptions::default()
        };
        let questions = extract_questions(text, "randomfile.pdf", &options);
        assert_eq!(questions.len(), 1);

        let q = &questions[0];
        assert_eq!(q.id, "problem-1");
        assert_eq!(q.title, "Serialize and Deserialize");
        assert_eq!(q.difficulty, Difficulty::Hard);
        assert_eq!(q.frequency, 61);
        assert_eq!(q.acceptance, 0.0);
        assert_eq!(q.company, "");
        assert_eq!(q.url, "");
    }

    #[test]
    fn test_appended_continuation_feeds_title_and_topics() {
        let text = "1 Serialize and Deserialize\nBinary Tree\n55.1% Hard";
        let options = ExtractOptions {
            continuation: ContinuationPolicy::Append,
            ..ExtractOptions::default()
        };
        let questions = extract_questions(text, "meta-questions.pdf", &options);
        assert_eq!(questions[0].title, "Serialize and Deserialize Binary Tree");
        assert!(questions[0].topics.contains(&"Tree".to_string()));
        assert_eq!(questions[0].frequency, 80);
    }

    #[test]
    fn test_unparsed_row_takes_frequency_from_its_percentage() {
        let questions = extract_questions(
            "3 LRU Cache 40% (premium)\n4 Design Twitter",
            "amazon-x.pdf",
            &ExtractOptions::default(),
        );
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "problem-1");
        assert_eq!(questions[0].frequency, 65);
        assert_eq!(questions[0].acceptance, 40.0);
        assert_eq!(questions[1].frequency, 50);
        assert_eq!(questions[1].acceptance, 0.0);
    }

    #[test]
    fn test_single_line_without_reference_uses_title_slug() {
        let questions = extract_questions("7 Valid  Anagram 63% Easy", "", &ExtractOptions::default());
        assert_eq!(questions[0].id, "valid-anagram");
        assert_eq!(questions[0].title, "Valid Anagram");
        assert_eq!(questions[0].url, "");
    }

    #[test]
    fn test_noise_only_document_yields_no_questions() {
        let questions = extract_questions(
            "Show 10 rows\nAcceptance\n\n%",
            "amazon-x.pdf",
            &ExtractOptions::default(),
        );
        assert!(questions.is_empty());
    }

    #[test]
    fn test_empty_document_is_a_failed_outcome() {
        let outcome = extract_document("  \n ", "google-x.pdf", &ExtractOptions::default());
        assert!(!outcome.success);
        assert!(outcome.questions.is_empty());
        assert_eq!(outcome.count, 0);
        assert!(outcome.error.unwrap().contains("no extractable text"));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let documents = vec![
            DocumentInput {
                text: TWO_ROWS.to_string(),
                filename: "google-a.pdf".to_string(),
            },
            DocumentInput {
                text: String::new(),
                filename: "amazon-b.pdf".to_string(),
            },
        ];
        let outcomes = extract_batch(&documents, &ExtractOptions::default());
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].success);
        assert_eq!(outcomes[0].count, 2);
        assert_eq!(outcomes[0].company.as_deref(), Some("Google"));
        assert_eq!(outcomes[0].statistics.as_ref().unwrap().by_company["Google"], 2);
        assert!(!outcomes[1].success);
    }

    #[test]
    fn test_failed_outcome_serializes_error_and_empty_questions() {
        let outcome = ExtractionOutcome::failed("x.pdf", ExtractionError::Decode("bad xref".into()));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["questions"], serde_json::json!([]));
        assert_eq!(value["error"], "failed to decode document: bad xref");
        assert!(value.get("statistics").is_none());
    }
}
