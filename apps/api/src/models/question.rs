use serde::{Deserialize, Serialize};

use crate::extraction::normalize::{title_slug, FALLBACK_TOPIC};

/// Canonical difficulty. Any unrecognised label deserializes to `Medium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Case-insensitive label lookup, defaulting to `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }
}

impl From<String> for Difficulty {
    fn from(label: String) -> Self {
        Difficulty::from_label(&label)
    }
}

/// One question record produced directly from a document's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedQuestion {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub frequency: u32,
    pub topics: Vec<String>,
    pub company: String,
    pub acceptance: f64,
    pub url: String,
}

/// Cross-source form: one record per distinct title, with every company that asks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardQuestion {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub frequency: u32,
    pub topics: Vec<String>,
    pub companies: Vec<String>,
    #[serde(default)]
    pub acceptance: f64,
    #[serde(default)]
    pub url: String,
}

/// Loosely shaped question accepted from API callers: a single `company`, a `companies` list,
/// or both. Missing fields fall back to the same defaults the extractor uses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub frequency: f64,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub companies: Option<Vec<String>>,
    #[serde(default)]
    pub acceptance: f64,
    #[serde(default)]
    pub url: String,
}

/// Read access shared by extracted and merged questions, used by statistics.
pub trait QuestionView {
    fn difficulty(&self) -> Difficulty;
    fn frequency(&self) -> u32;
    fn topics(&self) -> &[String];
    fn companies(&self) -> Vec<&str>;
}

impl QuestionView for ExtractedQuestion {
    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn topics(&self) -> &[String] {
        &self.topics
    }

    fn companies(&self) -> Vec<&str> {
        if self.company.is_empty() {
            Vec::new()
        } else {
            vec![self.company.as_str()]
        }
    }
}

impl QuestionView for StandardQuestion {
    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn topics(&self) -> &[String] {
        &self.topics
    }

    fn companies(&self) -> Vec<&str> {
        self.companies.iter().map(String::as_str).collect()
    }
}

/// Conversion into the merged form. `None` means the record has no usable title and is skipped.
pub trait IntoStandard {
    fn into_standard(self) -> Option<StandardQuestion>;
}

impl IntoStandard for StandardQuestion {
    fn into_standard(mut self) -> Option<StandardQuestion> {
        if self.title.trim().is_empty() {
            return None;
        }
        self.companies = normalize_companies(self.companies);
        Some(self)
    }
}

impl IntoStandard for ExtractedQuestion {
    fn into_standard(self) -> Option<StandardQuestion> {
        if self.title.trim().is_empty() {
            return None;
        }
        Some(StandardQuestion {
            id: self.id,
            title: self.title,
            difficulty: self.difficulty,
            frequency: self.frequency,
            topics: self.topics,
            companies: normalize_companies(vec![self.company]),
            acceptance: self.acceptance,
            url: self.url,
        })
    }
}

impl IntoStandard for QuestionRecord {
    fn into_standard(self) -> Option<StandardQuestion> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;

        let mut companies = self.companies.unwrap_or_default();
        companies.extend(self.company);

        let topics = if self.topics.is_empty() {
            vec![FALLBACK_TOPIC.to_string()]
        } else {
            self.topics
        };

        Some(StandardQuestion {
            id: self
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| title_slug(&title)),
            title,
            difficulty: self.difficulty,
            frequency: self.frequency.clamp(0.0, 100.0).round() as u32,
            topics,
            companies: normalize_companies(companies),
            acceptance: self.acceptance.clamp(0.0, 100.0),
            url: self.url,
        })
    }
}

/// Trims, drops blanks and removes duplicates while keeping first-seen order.
pub fn normalize_companies(companies: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(companies.len());
    for company in companies {
        let company = company.trim();
        if !company.is_empty() && !out.iter().any(|c| c == company) {
            out.push(company.to_string());
        }
    }
    out
}
