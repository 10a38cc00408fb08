use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::extraction::accumulator::ContinuationPolicy;
use crate::extraction::dedup::FrequencyBlend;
use crate::extraction::pipeline::ExtractOptions;

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Redis backs the extraction cache when set; otherwise an in-process cache is used.
    pub redis_url: Option<String>,
    pub cache_ttl_secs: u64,
    pub default_frequency: u32,
    pub join_continuation_lines: bool,
    pub frequency_blend: FrequencyBlend,
    pub curated_questions_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let default_frequency: u32 = parse_env("DEFAULT_FREQUENCY", 50)?;
        if default_frequency > 100 {
            return Err(anyhow!(
                "DEFAULT_FREQUENCY must be between 0 and 100, got {default_frequency}"
            ));
        }

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            redis_url: optional_env("REDIS_URL"),
            cache_ttl_secs: parse_env("CACHE_TTL_SECS", 86_400)?,
            default_frequency,
            join_continuation_lines: parse_env("JOIN_CONTINUATION_LINES", false)?,
            frequency_blend: match optional_env("FREQUENCY_BLEND") {
                Some(raw) => raw.parse::<FrequencyBlend>().map_err(|e| anyhow!(e))?,
                None => FrequencyBlend::default(),
            },
            curated_questions_path: optional_env("CURATED_QUESTIONS_PATH"),
        })
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            default_frequency: self.default_frequency,
            continuation: if self.join_continuation_lines {
                ContinuationPolicy::Append
            } else {
                ContinuationPolicy::Ignore
            },
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
