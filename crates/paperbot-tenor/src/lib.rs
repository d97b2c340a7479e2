//! Tenor adapter (keyword → GIF URL).
//!
//! Implements the `paperbot-core` GifFinder port over the Tenor v1 search
//! API. The response is deserialized into typed structs with optional fields
//! so an unexpected shape becomes a typed error instead of a panic, and an
//! empty result list is a plain "no match".

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use paperbot_core::{errors::Error, ports::GifFinder, Result};

const DEFAULT_BASE_URL: &str = "https://api.tenor.com";

#[derive(Clone, Debug)]
pub struct TenorClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    media: Vec<MediaEntry>,
}

#[derive(Debug, Deserialize)]
struct MediaEntry {
    gif: Option<MediaVariant>,
}

#[derive(Debug, Deserialize)]
struct MediaVariant {
    url: String,
}

impl TenorClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client build");
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            http,
        }
    }
}

#[async_trait]
impl GifFinder for TenorClient {
    async fn find_gif(&self, query: &str) -> Result<Option<String>> {
        let url = format!("{}/v1/search", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("q", query), ("key", &self.api_key), ("limit", "1")])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::BadResponse(format!(
                "tenor search failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: SearchResponse = resp
            .json()
            .await
            .map_err(|e| Error::BadResponse(format!("tenor json error: {e}")))?;

        let Some(first) = parsed.results.first() else {
            debug!("tenor: no results for {query:?}");
            return Ok(None);
        };

        let gif_url = first
            .media
            .first()
            .and_then(|m| m.gif.as_ref())
            .map(|v| v.url.clone())
            .ok_or_else(|| {
                Error::BadResponse("tenor result is missing a gif media entry".to_string())
            })?;

        Ok(Some(gif_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_the_first_gif_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("q", "cats"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{
                    "media": [{
                        "gif": { "url": "https://media.tenor.com/cat.gif" },
                        "tinygif": { "url": "https://media.tenor.com/cat-tiny.gif" }
                    }]
                }]
            })))
            .mount(&server)
            .await;

        let client = TenorClient::with_base_url("key", server.uri());
        let url = client.find_gif("cats").await.unwrap();
        assert_eq!(url.as_deref(), Some("https://media.tenor.com/cat.gif"));
    }

    #[tokio::test]
    async fn empty_result_list_is_none_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })),
            )
            .mount(&server)
            .await;

        let client = TenorClient::with_base_url("key", server.uri());
        assert_eq!(client.find_gif("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn result_without_media_is_a_typed_bad_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{ "media": [] }]
            })))
            .mount(&server)
            .await;

        let client = TenorClient::with_base_url("key", server.uri());
        let err = client.find_gif("odd").await.unwrap_err();
        assert!(matches!(err, Error::BadResponse(_)));
    }

    #[tokio::test]
    async fn non_success_status_is_a_typed_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let client = TenorClient::with_base_url("key", server.uri());
        let err = client.find_gif("cats").await.unwrap_err();
        match err {
            Error::BadResponse(msg) => assert!(msg.contains("429")),
            other => panic!("expected BadResponse, got {other:?}"),
        }
    }
}
