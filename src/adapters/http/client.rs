//! Shared HTTP client for the export and render services
//!
//! Wraps a `reqwest::Client` with the service base URL, bearer authentication,
//! status-to-error mapping and exponential-backoff retries for idempotent reads.

use crate::config::{bearer_header, RendererConfig, RetryConfig, SecretString, ServiceConfig};
use crate::domain::{FolioError, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// HTTP client bound to one service base URL
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: Client,
    base_url: Url,
    api_token: Option<SecretString>,
    retry: RetryConfig,
    timeout: Duration,
}

impl ServiceClient {
    /// Creates a client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is invalid or the
    /// underlying HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        tls_verify: bool,
        api_token: Option<SecretString>,
        retry: RetryConfig,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FolioError::Configuration(format!("Invalid base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FolioError::Configuration(format!(
                "Base URL cannot carry a path: {base_url}"
            )));
        }

        let mut builder = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30));

        if !tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| FolioError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_token,
            retry,
            timeout,
        })
    }

    /// Client for the export service
    pub fn for_service(config: &ServiceConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.timeout_seconds),
            config.tls_verify,
            config.api_token.clone(),
            config.retry.clone(),
        )
    }

    /// Client for the render service
    ///
    /// The render service shares the export service token and TLS setting.
    pub fn for_renderer(renderer: &RendererConfig, service: &ServiceConfig) -> Result<Self> {
        Self::new(
            &renderer.base_url,
            Duration::from_secs(renderer.timeout_seconds),
            service.tls_verify,
            service.api_token.clone(),
            service.retry.clone(),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins path segments onto the base URL, percent-encoding each one
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                FolioError::Configuration(format!(
                    "Base URL cannot carry a path: {}",
                    self.base_url
                ))
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_token {
            Some(token) => builder.header(AUTHORIZATION, bearer_header(token)),
            None => builder,
        }
    }

    /// Sends a request and maps transport errors and non-success statuses
    async fn send(&self, builder: RequestBuilder, operation: &str) -> Result<Response> {
        let resp = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                FolioError::timeout(operation, self.timeout)
            } else {
                FolioError::Connection(format!("{operation} request failed: {e}"))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(FolioError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp)
    }

    /// GET returning JSON, retried with backoff
    pub async fn get_json<T: DeserializeOwned>(&self, segments: &[&str], operation: &str) -> Result<T> {
        let url = self.endpoint(segments)?;
        self.retry_request(operation, || async {
            let resp = self
                .send(self.request(Method::GET, url.clone()), operation)
                .await?;
            read_json(resp).await
        })
        .await
    }

    /// POST a JSON body returning JSON, sent once
    pub async fn post_json<B, T>(&self, segments: &[&str], body: &B, operation: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        let resp = self
            .send(self.request(Method::POST, url).json(body), operation)
            .await?;
        read_json(resp).await
    }

    /// POST a JSON body for a read-only query, retried with backoff
    pub async fn query_json<B, T>(&self, segments: &[&str], body: &B, operation: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        self.retry_request(operation, || async {
            let resp = self
                .send(self.request(Method::POST, url.clone()).json(body), operation)
                .await?;
            read_json(resp).await
        })
        .await
    }

    /// POST raw bytes with a content type and query parameters, returning JSON
    pub async fn post_bytes<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        bytes: Vec<u8>,
        content_type: &str,
        operation: &str,
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        let builder = self
            .request(Method::POST, url)
            .query(query)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        let resp = self.send(builder, operation).await?;
        read_json(resp).await
    }

    /// POST a JSON body and return the raw response
    ///
    /// `Ok(None)` for `204 No Content`.
    pub async fn post_for_body<B>(
        &self,
        segments: &[&str],
        body: &B,
        operation: &str,
    ) -> Result<Option<RawBody>>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        let resp = self
            .send(self.request(Method::POST, url).json(body), operation)
            .await?;

        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| FolioError::Connection(format!("{operation} body read failed: {e}")))?;

        Ok(Some(RawBody {
            content_type,
            bytes: bytes.to_vec(),
        }))
    }

    /// Retry an operation with exponential backoff
    ///
    /// Only transport errors, timeouts, `429` and `5xx` answers are retried.
    async fn retry_request<F, T, Fut>(&self, operation: &str, f: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_retries = self.retry.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match f().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_retries || !is_retryable(&e) {
                        return Err(e);
                    }

                    let delay = self.retry.delay_for(attempt);

                    tracing::warn!(
                        operation = operation,
                        attempt = attempt,
                        max_retries = max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying request after error"
                    );

                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// A non-JSON response body
#[derive(Debug, Clone)]
pub struct RawBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    resp.json::<T>()
        .await
        .map_err(|e| FolioError::Serialization(format!("Invalid response body: {e}")))
}

fn is_retryable(error: &FolioError) -> bool {
    match error {
        FolioError::Connection(_) | FolioError::Timeout { .. } => true,
        FolioError::Remote { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}
