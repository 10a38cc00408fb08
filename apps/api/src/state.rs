use std::sync::Arc;

use crate::config::Config;
use crate::extraction::cache::QuestionCache;
use crate::extraction::pipeline::ExtractOptions;
use crate::models::question::StandardQuestion;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Extraction cache. Redis when `REDIS_URL` is set, in-memory otherwise.
    pub cache: Arc<dyn QuestionCache>,
    /// Curated question set used by the merge endpoint. Loaded once at startup.
    pub curated: Arc<Vec<StandardQuestion>>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn extract_options(&self) -> ExtractOptions {
        self.config.extract_options()
    }
}
