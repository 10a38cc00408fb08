//! Extraction cache: persists extracted question lists keyed by document identity.
//!
//! Backends own expiry entirely. `AppState` holds an `Arc<dyn QuestionCache>`:
//! `RedisQuestionCache` when `REDIS_URL` is configured, `InMemoryQuestionCache` otherwise.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::question::ExtractedQuestion;

const KEY_PREFIX: &str = "prepdesk:questions:";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedExtraction {
    pub questions: Vec<ExtractedQuestion>,
    pub cached_at: DateTime<Utc>,
}

#[async_trait]
pub trait QuestionCache: Send + Sync {
    async fn get(&self, document: &str) -> Result<Option<CachedExtraction>, CacheError>;

    async fn put(&self, document: &str, questions: &[ExtractedQuestion]) -> Result<(), CacheError>;

    /// Backend label for logs and `/health`.
    fn backend(&self) -> &'static str;
}

pub fn cache_key(document: &str) -> String {
    format!("{KEY_PREFIX}{document}")
}

/// Document identity for an uploaded file: the filename plus a SHA-256 of its bytes,
/// so a new upload under a reused name never hits the previous entry.
pub fn upload_identity(filename: &str, bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{filename}:{:x}", hasher.finalize())
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory backend
// ────────────────────────────────────────────────────────────────────────────

pub struct InMemoryQuestionCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedExtraction>>,
}

impl InMemoryQuestionCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs.min(u32::MAX as u64) as i64),
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn is_expired(&self, entry: &CachedExtraction, now: DateTime<Utc>) -> bool {
        now - entry.cached_at >= self.ttl
    }
}

#[async_trait]
impl QuestionCache for InMemoryQuestionCache {
    async fn get(&self, document: &str) -> Result<Option<CachedExtraction>, CacheError> {
        let key = cache_key(document);
        let now = Utc::now();

        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                None => return Ok(None),
                Some(entry) if !self.is_expired(entry, now) => return Ok(Some(entry.clone())),
                Some(_) => {}
            }
        }

        debug!("Evicting expired cache entry {key}");
        self.entries.write().await.remove(&key);
        Ok(None)
    }

    async fn put(&self, document: &str, questions: &[ExtractedQuestion]) -> Result<(), CacheError> {
        let entry = CachedExtraction {
            questions: questions.to_vec(),
            cached_at: Utc::now(),
        };
        self.entries.write().await.insert(cache_key(document), entry);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Redis backend
// ────────────────────────────────────────────────────────────────────────────

pub struct RedisQuestionCache {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisQuestionCache {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }
}

#[async_trait]
impl QuestionCache for RedisQuestionCache {
    async fn get(&self, document: &str) -> Result<Option<CachedExtraction>, CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(cache_key(document)).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, document: &str, questions: &[ExtractedQuestion]) -> Result<(), CacheError> {
        let payload = serde_json::to_string(&CachedExtraction {
            questions: questions.to_vec(),
            cached_at: Utc::now(),
        })?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(cache_key(document))
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Difficulty;

    fn sample() -> Vec<ExtractedQuestion> {
        vec![ExtractedQuestion {
            id: "two-sum".to_string(),
            title: "Two Sum".to_string(),
            difficulty: Difficulty::Easy,
            frequency: 70,
            topics: vec!["Array".to_string()],
            company: "Google".to_string(),
            acceptance: 45.2,
            url: String::new(),
        }]
    }

    #[tokio::test]
    async fn test_memory_cache_round_trip() {
        let cache = InMemoryQuestionCache::new(3600);
        assert!(cache.get("google-a.pdf").await.unwrap().is_none());

        cache.put("google-a.pdf", &sample()).await.unwrap();
        let hit = cache.get("google-a.pdf").await.unwrap().unwrap();
        assert_eq!(hit.questions, sample());
        assert!(cache.get("amazon-a.pdf").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_expires_entries() {
        let cache = InMemoryQuestionCache::new(0);
        cache.put("google-a.pdf", &sample()).await.unwrap();
        assert!(cache.get("google-a.pdf").await.unwrap().is_none());
        assert!(cache.entries.read().await.is_empty());
    }

    #[test]
    fn test_cache_key_is_namespaced() {
        assert_eq!(cache_key("x.pdf"), "prepdesk:questions:x.pdf");
    }

    #[test]
    fn test_upload_identity_depends_on_content() {
        let first = upload_identity("google-a.pdf", b"%PDF-1.4 first");
        assert_eq!(first, upload_identity("google-a.pdf", b"%PDF-1.4 first"));
        assert_ne!(first, upload_identity("google-a.pdf", b"%PDF-1.4 second"));
        assert_ne!(first, upload_identity("meta-a.pdf", b"%PDF-1.4 first"));
        // "google-a.pdf:" + 64 hex chars
        assert!(first.starts_with("google-a.pdf:"));
        assert_eq!(first.len(), "google-a.pdf:".len() + 64);
    }
}
