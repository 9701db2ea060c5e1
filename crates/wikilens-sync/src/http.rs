//! HTTP client for the keyword-detection and study endpoints.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use wikilens_core::{ApiConfig, CoreError, DetectedKeyword};

/// Level assumed when the study endpoint reports no (or a zero) new level.
pub const DEFAULT_STUDY_LEVEL: f64 = 0.25;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid response: {0}")]
    Invalid(#[from] CoreError),
    #[error("keyword must not be empty")]
    EmptyKeyword,
}

/// Client for the backend that detects keywords in text and records study
/// sessions.
pub struct KeywordClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct DetectRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct StudyRequest<'a> {
    keyword: &'a str,
}

#[derive(Deserialize)]
struct StudyResponse {
    #[serde(default)]
    new_level: Option<f64>,
}

impl KeywordClient {
    /// Create a client for the given base URL.
    ///
    /// `base_url` should be like `http://localhost:8000` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client with a per-request timeout.
    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(api: &ApiConfig) -> Result<Self, SyncError> {
        Self::with_timeout(api.base_url.clone(), Duration::from_secs(api.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the service which keywords occur in `text`.
    ///
    /// Malformed records in the response are dropped; a response that is not
    /// a record list at all is an error.
    pub async fn detect_keywords(&self, text: &str) -> Result<Vec<DetectedKeyword>, SyncError> {
        let url = format!("{}/keywords", self.base_url);

        info!(url = %url, chars = text.chars().count(), "requesting keyword detection");
        let resp = self
            .client
            .post(&url)
            .json(&DetectRequest { text })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let records = wikilens_core::parse_records(&body)?;
        info!(count = records.len(), "detected keywords");
        Ok(records)
    }

    /// Like [`detect_keywords`](Self::detect_keywords), but any failure is
    /// logged and treated as "no detected keywords".
    pub async fn detect_keywords_or_default(&self, text: &str) -> Vec<DetectedKeyword> {
        match self.detect_keywords(text).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "keyword detection failed, continuing without detected keywords");
                Vec::new()
            }
        }
    }

    /// Record a study session for `keyword` and return its new knowledge
    /// score in `[0, 1]`.
    pub async fn simulate_study(&self, keyword: &str) -> Result<f64, SyncError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(SyncError::EmptyKeyword);
        }
        let url = format!("{}/simulate-study", self.base_url);

        info!(url = %url, keyword, "recording study session");
        let resp = self
            .client
            .post(&url)
            .json(&StudyRequest { keyword })
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let result: StudyResponse = serde_json::from_str(&body)?;
        let level = match result.new_level {
            Some(level) if level.is_finite() && level != 0.0 => level.clamp(0.0, 1.0),
            _ => DEFAULT_STUDY_LEVEL,
        };
        info!(keyword, level, "study session recorded");
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn keywords_router() -> Router {
        Router::new().route(
            "/keywords",
            post(|Json(body): Json<Value>| async move {
                let text = body["text"].as_str().unwrap_or_default().to_string();
                Json(json!([
                    { "keyword": "LLM", "knowledge_level": 0.9 },
                    { "knowledge_level": 0.2 },
                    {
                        "keyword": "echo",
                        "related_documents": [
                            { "file_name": "request", "page_number": 1, "text": text }
                        ]
                    }
                ]))
            }),
        )
    }

    fn study_router(response: Value) -> Router {
        Router::new().route(
            "/simulate-study",
            post(move |Json(body): Json<Value>| {
                let mut response = response.clone();
                async move {
                    response["keyword"] = body["keyword"].clone();
                    Json(response)
                }
            }),
        )
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = KeywordClient::new("http://localhost:8000/".into());
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn client_from_config() {
        let api = ApiConfig {
            base_url: "http://keywords:9000//".into(),
            timeout_secs: 5,
        };
        let client = KeywordClient::from_config(&api).unwrap();
        assert_eq!(client.base_url(), "http://keywords:9000");
    }

    #[tokio::test]
    async fn detect_posts_text_and_validates_records() {
        let base = serve(keywords_router()).await;
        let client = KeywordClient::new(base);

        let records = client.detect_keywords("An LLM agent").await.unwrap();
        let keywords: Vec<&str> = records.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(keywords, ["LLM", "echo"]);
        assert_eq!(records[0].knowledge_level, 0.9);
        assert_eq!(records[1].related_documents[0].text, "An LLM agent");
    }

    #[tokio::test]
    async fn detect_reports_server_error() {
        let router = Router::new().route(
            "/keywords",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let client = KeywordClient::new(serve(router).await);

        let err = client.detect_keywords("text").await.unwrap_err();
        match err {
            SyncError::Server { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn detect_rejects_non_list_response() {
        let router = Router::new().route(
            "/keywords",
            post(|| async { Json(json!({ "error": "no model" })) }),
        );
        let client = KeywordClient::new(serve(router).await);
        assert!(matches!(
            client.detect_keywords("text").await,
            Err(SyncError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn detect_or_default_degrades_to_empty() {
        let router = Router::new().route(
            "/keywords",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = KeywordClient::new(serve(router).await);
        assert!(client.detect_keywords_or_default("text").await.is_empty());
    }

    #[tokio::test]
    async fn detect_or_default_survives_unreachable_service() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = KeywordClient::new(format!("http://{addr}"));
        assert!(client.detect_keywords_or_default("text").await.is_empty());
    }

    #[tokio::test]
    async fn study_returns_new_level() {
        let client = KeywordClient::new(serve(study_router(json!({ "new_level": 0.8 }))).await);
        assert_eq!(client.simulate_study("LLM").await.unwrap(), 0.8);
    }

    #[tokio::test]
    async fn study_defaults_missing_or_zero_level() {
        let client = KeywordClient::new(serve(study_router(json!({}))).await);
        assert_eq!(client.simulate_study("LLM").await.unwrap(), DEFAULT_STUDY_LEVEL);

        let client = KeywordClient::new(serve(study_router(json!({ "new_level": 0 }))).await);
        assert_eq!(client.simulate_study("LLM").await.unwrap(), DEFAULT_STUDY_LEVEL);
    }

    #[tokio::test]
    async fn study_rejects_blank_keyword_without_request() {
        let client = KeywordClient::new("http://127.0.0.1:9".into());
        assert!(matches!(
            client.simulate_study("   ").await,
            Err(SyncError::EmptyKeyword)
        ));
    }
}
