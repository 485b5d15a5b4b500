//! reqwest wrapper with retries for transient failures.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

use super::retry::{MAX_RETRIES, NonRetryableError, RETRY_DELAY_MS, check_retryable};

/// HTTP client with built-in retry logic for network operations.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// GET `url` and deserialize the JSON body.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        debug!("GET {} {:?}", url, query);

        self.with_retry("GET JSON", || async {
            let response = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .context("Failed to send request")?
                .error_for_status()
                .map_err(check_retryable)?;

            response
                .json::<T>()
                .await
                .context("Failed to parse JSON response")
        })
        .await
    }

    /// GET `url` and return the whole body.
    #[tracing::instrument(skip(self))]
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .with_retry("Download", || async {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .context("Failed to start download request")?
                    .error_for_status()
                    .map_err(check_retryable)?;

                let body = response
                    .bytes()
                    .await
                    .context("Failed to read download stream")?;
                Ok(body.to_vec())
            })
            .await?;

        debug!(
            "Downloaded {:.2} MB from {}",
            bytes.len() as f64 / (1024.0 * 1024.0),
            url
        );
        Ok(bytes)
    }

    /// Runs `operation` up to [`MAX_RETRIES`] times, stopping early on a
    /// [`NonRetryableError`].
    async fn with_retry<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.downcast_ref::<NonRetryableError>().is_some() => {
                    debug!("{}: not retrying: {}", operation_name, e);
                    return Err(e);
                }
                Err(e) if attempt >= MAX_RETRIES => {
                    return Err(e.context(format!(
                        "{} failed after {} attempts",
                        operation_name, MAX_RETRIES
                    )));
                }
                Err(e) => {
                    warn!(
                        "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                        operation_name, attempt, MAX_RETRIES, e, RETRY_DELAY_MS
                    );
                    tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_get_json_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/test?page=1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "test", "value": 42}"#)
            .create_async()
            .await;

        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct TestResponse {
            name: String,
            value: i32,
        }

        let client = HttpClient::new(Client::new());
        let result: TestResponse = client
            .get_json(&format!("{}/test", server.url()), &[("page", "1")])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            result,
            TestResponse {
                name: "test".into(),
                value: 42
            }
        );
    }

    #[tokio::test]
    async fn test_get_json_not_found_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/test")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: Result<serde_json::Value> =
            client.get_json(&format!("{}/test", server.url()), &[]).await;

        mock.assert_async().await;
        let err = result.unwrap_err();
        assert!(err.downcast_ref::<NonRetryableError>().is_some());
    }

    #[tokio::test]
    async fn test_download_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/file.bin")
            .with_status(200)
            .with_body("test content")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let bytes = client
            .download(&format!("{}/file.bin", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, b"test content");
    }

    #[tokio::test]
    async fn test_download_not_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/file.bin")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client.download(&format!("{}/file.bin", server.url())).await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_with_retry_retries_transient_errors() {
        let client = HttpClient::new(Client::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let result = client
            .with_retry("test", || {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(anyhow::anyhow!("connection reset"))
                    } else {
                        Ok("success after retries")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "success after retries");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_gives_up() {
        let client = HttpClient::new(Client::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let result: Result<()> = client
            .with_retry("test", || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(anyhow::anyhow!("connection timeout"))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES);
    }

    #[tokio::test]
    async fn test_with_retry_stops_on_non_retryable() {
        let client = HttpClient::new(Client::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let result: Result<()> = client
            .with_retry("test", || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(NonRetryableError::NotFound("x".into()).into())
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
