//! Low-level HTTP client — `InscriptionHttp`.
//!
//! One method per API endpoint. Returns wire types; normalization into
//! domain types happens in the layers above.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::job::wire::{
    HolderInscriptionsResponse, InscriptionNumberDetails, InscriptionNumbersParams, JobSnapshot,
    StartInscriptionBody, WebSocketServersResponse,
};
use crate::error::HttpError;
use crate::http::retry::{RetryConfig, RetryPolicy};

/// Size and media type reported for a remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub mime_type: String,
}

/// Low-level HTTP client for the inscription REST API.
#[derive(Clone)]
pub struct InscriptionHttp {
    base_url: String,
    client: Client,
    /// Client without the API key, for probing third-party file URLs.
    probe_client: Client,
    api_key: String,
}

impl std::fmt::Debug for InscriptionHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InscriptionHttp")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl InscriptionHttp {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()?;
        let probe_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            probe_client,
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Inscriptions ─────────────────────────────────────────────────────

    pub async fn start_inscription(
        &self,
        body: &StartInscriptionBody,
    ) -> Result<JobSnapshot, HttpError> {
        let url = format!("{}/inscriptions/start-inscription", self.base_url);
        self.post(&url, body, RetryPolicy::None).await
    }

    /// Single status read. Callers that want retries wrap this in
    /// [`with_retry`](crate::http::retry::with_retry).
    pub async fn retrieve_inscription(&self, id: &str) -> Result<JobSnapshot, HttpError> {
        let url = format!(
            "{}/inscriptions/retrieve-inscription?id={}",
            self.base_url,
            urlencoding::encode(id)
        );
        self.get(&url, RetryPolicy::None).await
    }

    pub async fn websocket_servers(&self) -> Result<WebSocketServersResponse, HttpError> {
        let url = format!("{}/inscriptions/websocket-servers", self.base_url);
        self.get(&url, RetryPolicy::Idempotent).await
    }

    pub async fn inscription_numbers(
        &self,
        params: &InscriptionNumbersParams,
    ) -> Result<Vec<InscriptionNumberDetails>, HttpError> {
        let mut url = format!("{}/inscriptions/numbers", self.base_url);
        let query = serde_urlencoded::to_string(params)
            .map_err(|e| HttpError::BadRequest(e.to_string()))?;
        if !query.is_empty() {
            url = format!("{}?{}", url, query);
        }
        self.get(&url, RetryPolicy::Idempotent).await
    }

    pub async fn holder_inscriptions(
        &self,
        holder_id: &str,
        include_collections: bool,
    ) -> Result<HolderInscriptionsResponse, HttpError> {
        let mut url = format!(
            "{}/inscriptions/holder-inscriptions?holderId={}",
            self.base_url,
            urlencoding::encode(holder_id)
        );
        if include_collections {
            url = format!("{}&includeCollections=1", url);
        }
        self.get(&url, RetryPolicy::Idempotent).await
    }

    // ── Remote files ─────────────────────────────────────────────────────

    /// HEAD a remote file for its size and content type.
    pub async fn file_metadata(&self, url: &str) -> Result<FileMetadata, HttpError> {
        let resp = self.probe_client.head(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(map_status(status.as_u16(), String::new()));
        }

        let headers = resp.headers();
        let size = headers
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);
        let mime_type = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Ok(FileMetadata { size, mime_type })
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: &str, retry: RetryPolicy) -> Result<T, HttpError> {
        self.request_with_retry(reqwest::Method::GET, url, None::<&()>, retry)
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        self.request_with_retry(reqwest::Method::POST, url, Some(body), retry)
            .await
    }

    async fn request_with_retry<T: DeserializeOwned, B: Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&B>,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let config = match retry {
            RetryPolicy::None => {
                return self.do_request(&method, url, body).await;
            }
            RetryPolicy::Idempotent => RetryConfig::idempotent(),
        };

        let mut attempt = 0;
        loop {
            let e = match self.do_request::<T, B>(&method, url, body).await {
                Ok(resp) => return Ok(resp),
                Err(e) => e,
            };
            let should_retry = match &e {
                HttpError::ServerError { status, .. } => config.retryable_statuses.contains(status),
                HttpError::RateLimited { retry_after_ms } => {
                    if let Some(ms) = retry_after_ms {
                        tokio::time::sleep(Duration::from_millis(*ms)).await;
                    }
                    config.retryable_statuses.contains(&429)
                }
                HttpError::Timeout => true,
                HttpError::Reqwest(re) => re.is_connect() || re.is_timeout() || re.is_request(),
                _ => false,
            };
            if !should_retry || attempt >= config.max_retries {
                return Err(e);
            }

            let delay = config.delay_for_attempt(attempt);
            tracing::debug!(
                attempt = attempt + 1,
                max = config.max_retries,
                delay_ms = delay.as_millis() as u64,
                "Retrying request to {}",
                url
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn do_request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &reqwest::Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, HttpError> {
        let mut req = self
            .client
            .request(method.clone(), url)
            .header("x-api-key", &self.api_key);

        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status.is_success() {
            let parsed = resp.json::<T>().await?;
            return Ok(parsed);
        }

        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let body_text = resp.text().await.unwrap_or_default();

        match map_status(status.as_u16(), body_text) {
            HttpError::RateLimited { .. } => Err(HttpError::RateLimited { retry_after_ms }),
            other => Err(other),
        }
    }
}

fn map_status(status_code: u16, body_text: String) -> HttpError {
    match status_code {
        401 => HttpError::Unauthorized,
        404 => HttpError::NotFound(server_message(&body_text)),
        429 => HttpError::RateLimited {
            retry_after_ms: None,
        },
        400..=499 => HttpError::BadRequest(server_message(&body_text)),
        _ => HttpError::ServerError {
            status: status_code,
            body: body_text,
        },
    }
}

/// The `message` (or `error`) field of a JSON error body, else the raw body.
pub(crate) fn server_message(body_text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body_text)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body_text.to_string())
}
