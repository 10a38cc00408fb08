//! Merge with the curated question set. Extracted questions whose title already exists
//! in the curated set (case-insensitive exact match) are skipped.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::question::{ExtractedQuestion, IntoStandard, StandardQuestion};

#[derive(Debug, Clone, Serialize)]
pub struct MergeResult {
    pub questions: Vec<StandardQuestion>,
    pub added: usize,
    pub skipped: usize,
}

fn title_identity(title: &str) -> String {
    title.trim().to_lowercase()
}

pub fn merge_with_curated(
    curated: &[StandardQuestion],
    extracted: Vec<ExtractedQuestion>,
) -> MergeResult {
    let mut seen: HashSet<String> = curated.iter().map(|q| title_identity(&q.title)).collect();
    let mut questions = curated.to_vec();
    let mut skipped = 0;

    for question in extracted {
        if !seen.insert(title_identity(&question.title)) {
            skipped += 1;
            continue;
        }
        match question.into_standard() {
            Some(standard) => questions.push(standard),
            None => skipped += 1,
        }
    }

    MergeResult {
        added: questions.len() - curated.len(),
        questions,
        skipped,
    }
}

/// Loads the curated set from a JSON array of questions.
pub fn load_curated(path: &Path) -> Result<Vec<StandardQuestion>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read curated questions from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Curated questions file {} is not valid JSON", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Difficulty;

    fn curated(title: &str) -> StandardQuestion {
        StandardQuestion {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            difficulty: Difficulty::Easy,
            frequency: 90,
            topics: vec!["Array".to_string()],
            companies: vec!["Google".to_string()],
            acceptance: 50.0,
            url: String::new(),
        }
    }

    fn extracted(title: &str) -> ExtractedQuestion {
        ExtractedQuestion {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            difficulty: Difficulty::Medium,
            frequency: 60,
            topics: vec!["General".to_string()],
            company: "Amazon".to_string(),
            acceptance: 35.0,
            url: String::new(),
        }
    }

    #[test]
    fn test_titles_already_curated_are_skipped() {
        let result = merge_with_curated(
            &[curated("Two Sum")],
            vec![extracted("two sum"), extracted("Jump Game")],
        );
        assert_eq!(result.added, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.questions.len(), 2);
        assert_eq!(result.questions[0].companies, vec!["Google"]);
        assert_eq!(result.questions[1].title, "Jump Game");
    }

    #[test]
    fn test_duplicate_extracted_titles_insert_once() {
        let result = merge_with_curated(&[], vec![extracted("Jump Game"), extracted("JUMP GAME")]);
        assert_eq!(result.added, 1);
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_load_curated_missing_file_errors() {
        assert!(load_curated(Path::new("/nonexistent/curated.json")).is_err());
    }
}
