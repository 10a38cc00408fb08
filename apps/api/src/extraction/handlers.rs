//! Axum route handlers for the Questions API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::cache::upload_identity;
use crate::extraction::dedup::{deduplicate, FrequencyBlend};
use crate::extraction::document::{extract_pdf, fetch_document, filename_from_url};
use crate::extraction::merge::{merge_with_curated, MergeResult};
use crate::extraction::pipeline::{
    extract_batch, extract_document, DocumentInput, ExtractionError, ExtractionOutcome,
};
use crate::extraction::stats::{compute_statistics, StatisticsSummary};
use crate::models::question::{
    ExtractedQuestion, IntoStandard, QuestionRecord, StandardQuestion,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BatchExtractRequest {
    pub documents: Vec<DocumentInput>,
}

#[derive(Debug, Serialize)]
pub struct BatchExtractResponse {
    pub results: Vec<ExtractionOutcome>,
    pub total_questions: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchExtractResponse {
    fn from_results(results: Vec<ExtractionOutcome>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total_questions: results.iter().map(|r| r.count).sum(),
            failed: results.len() - succeeded,
            succeeded,
            results,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExtractUrlRequest {
    pub url: String,
    /// Overrides the filename taken from the URL for company inference.
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionListRequest<Q> {
    pub questions: Vec<Q>,
}

#[derive(Debug, Deserialize)]
pub struct DeduplicateRequest {
    pub questions: Vec<QuestionRecord>,
    /// Defaults to the configured `FREQUENCY_BLEND`.
    #[serde(default)]
    pub blend: Option<FrequencyBlend>,
}

#[derive(Debug, Serialize)]
pub struct DeduplicateResponse {
    pub questions: Vec<StandardQuestion>,
    pub statistics: StatisticsSummary,
}

// ────────────────────────────────────────────────────────────────────────────
// Cache helpers. Cache failures degrade to a miss, never to a request error.
// ────────────────────────────────────────────────────────────────────────────

async fn cached_outcome(state: &AppState, key: &str, filename: &str) -> Option<ExtractionOutcome> {
    match state.cache.get(key).await {
        Ok(Some(hit)) => {
            info!("Cache hit for {key} ({} questions)", hit.questions.len());
            Some(ExtractionOutcome::succeeded(filename, hit.questions))
        }
        Ok(None) => None,
        Err(e) => {
            warn!("Cache lookup failed for {key}: {e}");
            None
        }
    }
}

async fn store_outcome(state: &AppState, key: &str, outcome: &ExtractionOutcome) {
    if !outcome.success {
        return;
    }
    if let Err(e) = state.cache.put(key, &outcome.questions).await {
        warn!("Cache write failed for {key}: {e}");
    }
}

async fn extract_pdf_cached(state: AppState, filename: String, bytes: Bytes) -> ExtractionOutcome {
    let key = upload_identity(&filename, &bytes);
    if let Some(outcome) = cached_outcome(&state, &key, &filename).await {
        return outcome;
    }
    let outcome = extract_pdf(bytes, filename.clone(), state.extract_options()).await;
    store_outcome(&state, &key, &outcome).await;
    outcome
}

/// Collects upload results back into input order. Slots whose task died become failures.
async fn collect_in_order(
    mut set: JoinSet<(usize, ExtractionOutcome)>,
    filenames: Vec<String>,
) -> Vec<ExtractionOutcome> {
    let mut slots: Vec<Option<ExtractionOutcome>> = vec![None; filenames.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((i, outcome)) => slots[i] = Some(outcome),
            Err(e) => warn!("Extraction task failed: {e}"),
        }
    }

    slots
        .into_iter()
        .zip(filenames)
        .map(|(slot, filename)| {
            slot.unwrap_or_else(|| {
                ExtractionOutcome::failed(
                    &filename,
                    ExtractionError::Decode("extraction task aborted".to_string()),
                )
            })
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/questions/extract
///
/// Extracts questions from already-decoded text on a blocking task. Unusable text is
/// reported in the outcome.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<DocumentInput>,
) -> Json<ExtractionOutcome> {
    let options = state.extract_options();
    let filename = request.filename.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        extract_document(&request.text, &request.filename, &options)
    })
    .await
    .unwrap_or_else(|e| {
        warn!("Extraction task failed: {e}");
        ExtractionOutcome::failed(&filename, ExtractionError::Decode(e.to_string()))
    });

    Json(outcome)
}

/// POST /api/v1/questions/extract/batch
///
/// Runs the whole batch on a blocking task; each item succeeds or fails independently.
pub async fn handle_extract_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchExtractRequest>,
) -> Result<Json<BatchExtractResponse>, AppError> {
    if request.documents.is_empty() {
        return Err(AppError::Validation("documents cannot be empty".to_string()));
    }

    let options = state.extract_options();
    let documents = request.documents;
    let filenames: Vec<String> = documents.iter().map(|d| d.filename.clone()).collect();

    let results = tokio::task::spawn_blocking(move || extract_batch(&documents, &options))
        .await
        .unwrap_or_else(|e| {
            warn!("Batch extraction task failed: {e}");
            filenames
                .iter()
                .map(|f| {
                    ExtractionOutcome::failed(f, ExtractionError::Decode(e.to_string()))
                })
                .collect()
        });

    info!("Batch extraction finished: {} documents", results.len());
    Ok(Json(BatchExtractResponse::from_results(results)))
}

/// POST /api/v1/questions/extract/pdf
///
/// Accepts one or more PDF files as multipart parts. Results are cached by filename and
/// content digest.
pub async fn handle_extract_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchExtractResponse>, AppError> {
    let mut files: Vec<(String, Bytes)> = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        files.push((filename, field.bytes().await?));
    }

    if files.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "upload contained no files".to_string(),
        ));
    }

    let filenames: Vec<String> = files.iter().map(|(name, _)| name.clone()).collect();
    let mut set = JoinSet::new();
    for (i, (filename, bytes)) in files.into_iter().enumerate() {
        let state = state.clone();
        set.spawn(async move { (i, extract_pdf_cached(state, filename, bytes).await) });
    }

    let results = collect_in_order(set, filenames).await;
    Ok(Json(BatchExtractResponse::from_results(results)))
}

/// POST /api/v1/questions/extract/url
///
/// Fetches a remote PDF and extracts it. Results are cached by URL.
pub async fn handle_extract_url(
    State(state): State<AppState>,
    Json(request): Json<ExtractUrlRequest>,
) -> Result<Json<ExtractionOutcome>, AppError> {
    let url = request.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::Validation(
            "url must be an http(s) URL".to_string(),
        ));
    }

    let filename = request
        .filename
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| filename_from_url(url));

    if let Some(outcome) = cached_outcome(&state, url, &filename).await {
        return Ok(Json(outcome));
    }

    let outcome = match fetch_document(&state.http, url).await {
        Ok(bytes) => extract_pdf(bytes, filename, state.extract_options()).await,
        Err(e) => {
            warn!("Fetch failed for {url}: {e}");
            ExtractionOutcome::failed(&filename, e)
        }
    };
    store_outcome(&state, url, &outcome).await;
    Ok(Json(outcome))
}

/// POST /api/v1/questions/deduplicate
pub async fn handle_deduplicate(
    State(state): State<AppState>,
    Json(request): Json<DeduplicateRequest>,
) -> Json<DeduplicateResponse> {
    let blend = request.blend.unwrap_or(state.config.frequency_blend);
    let questions = deduplicate(request.questions, blend);
    let statistics = compute_statistics(&questions);
    Json(DeduplicateResponse {
        questions,
        statistics,
    })
}

/// POST /api/v1/questions/statistics
pub async fn handle_statistics(
    Json(request): Json<QuestionListRequest<QuestionRecord>>,
) -> Json<StatisticsSummary> {
    let questions: Vec<StandardQuestion> = request
        .questions
        .into_iter()
        .filter_map(IntoStandard::into_standard)
        .collect();
    Json(compute_statistics(&questions))
}

/// POST /api/v1/questions/merge
///
/// Returns the curated set plus extracted questions whose titles it does not already contain.
pub async fn handle_merge(
    State(state): State<AppState>,
    Json(request): Json<QuestionListRequest<ExtractedQuestion>>,
) -> Json<MergeResult> {
    Json(merge_with_curated(&state.curated, request.questions))
}
