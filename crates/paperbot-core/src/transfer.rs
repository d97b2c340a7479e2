//! Download a resource to a local path.
//!
//! No retry, no partial-content resume, no size cap — the full body is
//! buffered in memory before being written out.

use std::path::Path;

use tracing::debug;

use crate::{Error, Result};

/// Fetch `url` (optionally with a bearer credential, for platform-hosted
/// files) and write the body verbatim to `dest`. Returns the byte count.
///
/// Non-success statuses become [`Error::Transfer`]; network-layer failures
/// propagate unchanged as [`Error::Network`].
pub async fn download_to(
    client: &reqwest::Client,
    url: &str,
    bearer: Option<&str>,
    dest: &Path,
) -> Result<u64> {
    let mut req = client.get(url);
    if let Some(token) = bearer {
        req = req.bearer_auth(token);
    }

    let resp = req.send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Transfer {
            status: status.as_u16(),
        });
    }

    let body = resp.bytes().await?;
    tokio::fs::write(dest, &body).await?;
    debug!("downloaded {} bytes to {}", body.len(), dest.display());

    Ok(body.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn writes_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/file.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 body".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.pdf");
        let client = reqwest::Client::new();

        let n = download_to(&client, &format!("{}/file.pdf", server.uri()), None, &dest)
            .await
            .unwrap();

        assert_eq!(n, 13);
        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.4 body");
    }

    #[tokio::test]
    async fn sends_bearer_credential_when_given() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/private.pdf"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.pdf");
        let client = reqwest::Client::new();

        download_to(
            &client,
            &format!("{}/private.pdf", server.uri()),
            Some("secret-token"),
            &dest,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_a_transfer_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.pdf"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.pdf");
        let client = reqwest::Client::new();

        let err = download_to(&client, &format!("{}/missing.pdf", server.uri()), None, &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transfer { status: 404 }));
        assert!(!dest.exists());
    }
}
