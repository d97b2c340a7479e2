//! ConvertAPI adapter (PDF → PPTX).
//!
//! Implements the `paperbot-core` SlideConverter port over the ConvertAPI
//! REST interface: multipart file submission, JSON response with the
//! converted files inlined as base64.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use tracing::debug;

use paperbot_core::{errors::Error, ports::SlideConverter, tempfiles::unique_stem, Result};

const DEFAULT_BASE_URL: &str = "https://v2.convertapi.com";

#[derive(Clone, Debug)]
pub struct ConvertApiClient {
    secret: String,
    base_url: String,
    http: reqwest::Client,
}

/// Response envelope for a conversion request.
#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[serde(rename = "Files", default)]
    files: Vec<ConvertedFile>,
}

/// One produced file. ConvertAPI inlines small results as base64
/// (`FileData`); larger ones come back as a download URL.
#[derive(Debug, Deserialize)]
struct ConvertedFile {
    #[serde(rename = "FileName", default)]
    file_name: String,
    #[serde(rename = "FileData")]
    file_data: Option<String>,
    #[serde(rename = "Url")]
    url: Option<String>,
}

impl ConvertApiClient {
    /// Build a client. The HTTP client carries no overall timeout: a hung
    /// conversion stalls only its own invocation.
    pub fn new(secret: impl Into<String>) -> Self {
        Self::with_base_url(secret, DEFAULT_BASE_URL)
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(secret: impl Into<String>, base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .build()
            .expect("reqwest client build");
        Self {
            secret: secret.into(),
            base_url: base_url.into(),
            http,
        }
    }

    async fn submit(&self, src: &Path) -> Result<ConvertResponse> {
        let bytes = tokio::fs::read(src).await?;
        let file_name = src
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("input.pdf")
            .to_string();

        let form = reqwest::multipart::Form::new().part(
            "File",
            reqwest::multipart::Part::bytes(bytes)
                .file_name(file_name)
                .mime_str("application/pdf")
                .map_err(|e| Error::Conversion(format!("multipart error: {e}")))?,
        );

        let url = format!("{}/convert/pdf/to/pptx", self.base_url);
        let resp = self
            .http
            .post(&url)
            .query(&[("Secret", self.secret.as_str())])
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Conversion(format!(
                "service rejected input: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::BadResponse(format!("convertapi json error: {e}")))
    }

    async fn save_file(&self, file: &ConvertedFile, dest: &Path) -> Result<()> {
        if let Some(data) = &file.file_data {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(data)
                .map_err(|e| Error::BadResponse(format!("convertapi base64 error: {e}")))?;
            tokio::fs::write(dest, bytes).await?;
            return Ok(());
        }

        // Large results come back as a URL instead of inline data.
        if let Some(url) = &file.url {
            paperbot_core::transfer::download_to(&self.http, url, None, dest).await?;
            return Ok(());
        }

        Err(Error::BadResponse(format!(
            "converted file {:?} has neither FileData nor Url",
            file.file_name
        )))
    }
}

#[async_trait]
impl SlideConverter for ConvertApiClient {
    async fn convert_to_slides(&self, src: &Path, out_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(out_dir).await?;

        let resp = self.submit(src).await?;
        if resp.files.is_empty() {
            return Err(Error::Conversion("no converted files returned".to_string()));
        }
        debug!("convertapi returned {} file(s)", resp.files.len());

        // The first file is the deck; give it a deterministic name.
        let dest = out_dir.join(format!("{}.pptx", unique_stem("converted")));
        self.save_file(&resp.files[0], &dest).await?;

        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pptx_body(data: &[u8]) -> serde_json::Value {
        serde_json::json!({
            "ConversionCost": 4,
            "Files": [{
                "FileName": "deck.pptx",
                "FileExt": "pptx",
                "FileSize": data.len(),
                "FileData": base64::engine::general_purpose::STANDARD.encode(data),
            }]
        })
    }

    async fn source_pdf(dir: &tempfile::TempDir) -> PathBuf {
        let src = dir.path().join("input.pdf");
        tokio::fs::write(&src, b"%PDF-1.4").await.unwrap();
        src
    }

    #[tokio::test]
    async fn saves_decoded_deck_under_a_deterministic_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/convert/pdf/to/pptx"))
            .and(query_param("Secret", "s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(pptx_body(b"deck-bytes")))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let src = source_pdf(&dir).await;
        let out_dir = dir.path().join("converted");

        let client = ConvertApiClient::with_base_url("s3cret", server.uri());
        let artifact = client.convert_to_slides(&src, &out_dir).await.unwrap();

        let name = artifact.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("converted_") && name.ends_with(".pptx"));
        assert_eq!(std::fs::read(&artifact).unwrap(), b"deck-bytes");
    }

    #[tokio::test]
    async fn zero_output_files_is_a_conversion_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/convert/pdf/to/pptx"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "Files": [] })),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let src = source_pdf(&dir).await;

        let client = ConvertApiClient::with_base_url("s3cret", server.uri());
        let err = client
            .convert_to_slides(&src, &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }

    #[tokio::test]
    async fn service_rejection_is_a_conversion_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/convert/pdf/to/pptx"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({ "Message": "invalid secret" })),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let src = source_pdf(&dir).await;

        let client = ConvertApiClient::with_base_url("bad", server.uri());
        let err = client
            .convert_to_slides(&src, &dir.path().join("out"))
            .await
            .unwrap_err();
        match err {
            Error::Conversion(msg) => assert!(msg.contains("401")),
            other => panic!("expected Conversion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_response_body_is_a_bad_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/convert/pdf/to/pptx"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let src = source_pdf(&dir).await;

        let client = ConvertApiClient::with_base_url("s3cret", server.uri());
        let err = client
            .convert_to_slides(&src, &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadResponse(_)));
    }
}
