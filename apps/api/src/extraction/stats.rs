use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::question::{Difficulty, QuestionView};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyCounts {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

/// Descriptive statistics over a finished question set. Derived, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    pub total_questions: usize,
    pub by_difficulty: DifficultyCounts,
    pub by_company: BTreeMap<String, usize>,
    /// Sorted by count, descending; ties keep first-seen order. Written as a
    /// `{topic: count}` object whose keys follow that order.
    #[serde(
        serialize_with = "serialize_topic_map",
        deserialize_with = "deserialize_topic_map"
    )]
    pub top_topics: Vec<TopicCount>,
    pub average_frequency: u32,
}

fn serialize_topic_map<S: Serializer>(
    topics: &[TopicCount],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(topics.iter().map(|t| (t.topic.as_str(), t.count)))
}

fn deserialize_topic_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<TopicCount>, D::Error> {
    struct TopicMapVisitor;

    impl<'de> Visitor<'de> for TopicMapVisitor {
        type Value = Vec<TopicCount>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object mapping topic to count")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut topics = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((topic, count)) = map.next_entry::<String, usize>()? {
                topics.push(TopicCount { topic, count });
            }
            Ok(topics)
        }
    }

    deserializer.deserialize_map(TopicMapVisitor)
}

pub fn compute_statistics<Q: QuestionView>(questions: &[Q]) -> StatisticsSummary {
    let total_questions = questions.len();
    if total_questions == 0 {
        return StatisticsSummary::default();
    }

    let mut by_difficulty = DifficultyCounts::default();
    let mut by_company: BTreeMap<String, usize> = BTreeMap::new();
    let mut top_topics: Vec<TopicCount> = Vec::new();
    let mut frequency_sum = 0u64;

    for question in questions {
        match question.difficulty() {
            Difficulty::Easy => by_difficulty.easy += 1,
            Difficulty::Medium => by_difficulty.medium += 1,
            Difficulty::Hard => by_difficulty.hard += 1,
        }

        for company in question.companies() {
            *by_company.entry(company.to_string()).or_insert(0) += 1;
        }

        for topic in question.topics() {
            match top_topics.iter_mut().find(|t| &t.topic == topic) {
                Some(entry) => entry.count += 1,
                None => top_topics.push(TopicCount {
                    topic: topic.clone(),
                    count: 1,
                }),
            }
        }

        frequency_sum += question.frequency() as u64;
    }

    top_topics.sort_by(|a, b| b.count.cmp(&a.count));

    StatisticsSummary {
        total_questions,
        by_difficulty,
        by_company,
        top_topics,
        average_frequency: (frequency_sum as f64 / total_questions as f64).round() as u32,
    }
}
