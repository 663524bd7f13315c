//! Question catalog lookup client
//!
//! Best-effort synchronous enrichment against the question service
//! (`GET /questions/{id}`). Lookups run under a bounded timeout; on timeout
//! or error the caller proceeds with a partially-populated event instead of
//! failing the submission.

use serde::Deserialize;
use std::time::Duration;

/// Question metadata used to enrich `answer.submitted` events
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMeta {
    #[serde(alias = "question_type")]
    pub question_type: Option<String>,
    pub practical: Option<bool>,
    pub difficulty: Option<String>,
}

/// HTTP client for the question catalog
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl CatalogClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Fetch question metadata, degrading to `None` on any failure
    ///
    /// The outer timeout bounds the whole lookup even if the HTTP client's
    /// own timeout misbehaves; a submission never waits longer than the
    /// configured enrichment budget.
    pub async fn fetch_question(&self, question_id: i64) -> Option<QuestionMeta> {
        let url = format!("{}/questions/{}", self.base_url, question_id);

        let lookup = async {
            let response = self.http.get(&url).send().await?;
            let response = response.error_for_status()?;
            response.json::<QuestionMeta>().await
        };

        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(meta)) => Some(meta),
            Ok(Err(e)) => {
                tracing::warn!(
                    question_id = question_id,
                    url = %url,
                    error = %e,
                    "Question catalog lookup failed, enrichment degraded"
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    question_id = question_id,
                    url = %url,
                    timeout_ms = self.timeout.as_millis(),
                    "Question catalog lookup timed out, enrichment degraded"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_catalog_degrades_to_none() {
        // Nothing listens on this port; the lookup must degrade, not error
        let client = CatalogClient::new(
            "http://127.0.0.1:1".to_string(),
            Duration::from_millis(200),
        );

        let meta = client.fetch_question(42).await;
        assert!(meta.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let client = CatalogClient::new(
            "http://localhost:8084/".to_string(),
            Duration::from_millis(200),
        );
        assert_eq!(client.base_url, "http://localhost:8084");
    }

    #[test]
    fn test_question_meta_accepts_snake_case_alias() {
        let meta: QuestionMeta =
            serde_json::from_str(r#"{"question_type": "multiple-choice", "practical": true}"#)
                .unwrap();
        assert_eq!(meta.question_type.as_deref(), Some("multiple-choice"));
        assert_eq!(meta.practical, Some(true));
        assert!(meta.difficulty.is_none());
    }
}
