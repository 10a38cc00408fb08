//! Upstream document collaborators: PDF decoding and remote retrieval.
//! Both report failures as `ExtractionError` so callers can turn them into failed outcomes.

use bytes::Bytes;
use tracing::info;

use crate::extraction::pipeline::{extract_document, ExtractOptions, ExtractionError, ExtractionOutcome};

/// Decodes PDF bytes to plain text.
pub fn decode_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::Decode(e.to_string()))
}

/// Decodes and extracts on a blocking thread. Decoder panics are reported as failures.
pub async fn extract_pdf(bytes: Bytes, filename: String, options: ExtractOptions) -> ExtractionOutcome {
    let name = filename.clone();
    let task = tokio::task::spawn_blocking(move || match decode_pdf(&bytes) {
        Ok(text) => extract_document(&text, &filename, &options),
        Err(e) => ExtractionOutcome::failed(&filename, e),
    });

    match task.await {
        Ok(outcome) => outcome,
        Err(e) => ExtractionOutcome::failed(&name, ExtractionError::Decode(e.to_string())),
    }
}

pub async fn fetch_document(client: &reqwest::Client, url: &str) -> Result<Bytes, ExtractionError> {
    info!("Fetching document {url}");
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ExtractionError::Fetch(e.to_string()))?;

    response
        .bytes()
        .await
        .map_err(|e| ExtractionError::Fetch(e.to_string()))
}

/// Last non-empty path segment of a URL, without query or fragment.
pub fn filename_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(matches!(
            decode_pdf(b"definitely not a pdf"),
            Err(ExtractionError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_pdf_reports_failure_outcome() {
        let outcome = extract_pdf(
            Bytes::from_static(b"not a pdf"),
            "google-broken.pdf".to_string(),
            ExtractOptions::default(),
        )
        .await;
        assert!(!outcome.success);
        assert!(outcome.questions.is_empty());
        assert_eq!(outcome.company.as_deref(), Some("Google"));
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://cdn.example.com/pdfs/amazon-Leetcode.pdf?dl=1"),
            "amazon-Leetcode.pdf"
        );
        assert_eq!(filename_from_url("https://example.com/a/b/"), "b");
    }
}
