//! Deduplicator: merges records describing the same question across companies and sources.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::extraction::normalize::title_slug;
use crate::models::question::{IntoStandard, StandardQuestion};

/// How the frequency of a repeated question is combined with the already merged one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyBlend {
    /// `round((existing + incoming) / 2)` against the last merged value. Order-sensitive
    /// once three or more sources share a title.
    #[default]
    Pairwise,
    /// True mean across every source merged into the key.
    RunningMean,
}

impl FromStr for FrequencyBlend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pairwise" => Ok(FrequencyBlend::Pairwise),
            "running_mean" | "running-mean" => Ok(FrequencyBlend::RunningMean),
            other => Err(format!(
                "unknown frequency blend '{other}' (expected 'pairwise' or 'running_mean')"
            )),
        }
    }
}

/// Merge identity: lowercased title with whitespace runs collapsed to hyphens.
pub fn dedup_key(title: &str) -> String {
    title_slug(title)
}

/// Incremental deduplicator. Output order is the order in which keys were first seen.
#[derive(Debug, Default)]
pub struct Deduplicator {
    blend: FrequencyBlend,
    index: HashMap<String, usize>,
    merged: Vec<StandardQuestion>,
    /// Per output slot: (number of sources, sum of their frequencies).
    tallies: Vec<(u32, f64)>,
}

impl Deduplicator {
    pub fn new(blend: FrequencyBlend) -> Self {
        Self {
            blend,
            ..Self::default()
        }
    }

    pub fn push<Q: IntoStandard>(&mut self, record: Q) {
        let Some(incoming) = record.into_standard() else {
            return;
        };
        let key = dedup_key(&incoming.title);

        match self.index.get(&key) {
            Some(&slot) => self.merge_into(slot, incoming),
            None => {
                self.index.insert(key, self.merged.len());
                self.tallies.push((1, incoming.frequency as f64));
                self.merged.push(incoming);
            }
        }
    }

    fn merge_into(&mut self, slot: usize, incoming: StandardQuestion) {
        let existing = &mut self.merged[slot];
        for company in incoming.companies {
            if !existing.companies.contains(&company) {
                existing.companies.push(company);
            }
        }

        let (count, sum) = &mut self.tallies[slot];
        *count += 1;
        *sum += incoming.frequency as f64;

        existing.frequency = match self.blend {
            FrequencyBlend::Pairwise => {
                ((existing.frequency as f64 + incoming.frequency as f64) / 2.0).round() as u32
            }
            FrequencyBlend::RunningMean => (*sum / *count as f64).round() as u32,
        };
    }

    pub fn finish(self) -> Vec<StandardQuestion> {
        self.merged
    }
}

impl<Q: IntoStandard> Extend<Q> for Deduplicator {
    fn extend<I: IntoIterator<Item = Q>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

/// One-shot deduplication of a record list.
pub fn deduplicate<I>(records: I, blend: FrequencyBlend) -> Vec<StandardQuestion>
where
    I: IntoIterator,
    I::Item: IntoStandard,
{
    let mut dedup = Deduplicator::new(blend);
    dedup.extend(records);
    dedup.finish()
}
