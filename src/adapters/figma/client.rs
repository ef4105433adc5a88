//! Figma REST API client
//!
//! [`FigmaClient`] implements [`DesignApi`] over HTTP. Each client owns one
//! [`RateLimiter`] per provider tier: image exports go through tier 1, file
//! reads through tier 2. Two clients never share limiter state.

use super::api::DesignApi;
use super::models::{FileDocument, ImageExportOptions, ImagesResponse};
use crate::config::{FigmaConfig, RetryConfig};
use crate::core::ratelimit::RateLimiter;
use crate::domain::{DesignApiError, DesignExportError, FileKey, NodeId, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, RETRY_AFTER};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Header carrying the personal access token
pub const TOKEN_HEADER: &str = "X-Figma-Token";

/// Figma API client with per-tier rate limiting
pub struct FigmaClient {
    base_url: String,
    http: Client,
    token: Option<HeaderValue>,
    images_limiter: RateLimiter,
    files_limiter: RateLimiter,
    retry: RetryConfig,
}

impl FigmaClient {
    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the access token isn't a valid
    /// header value or the HTTP client can't be built.
    pub fn new(config: FigmaConfig) -> Result<Self> {
        let http = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)))
            .user_agent(concat!("design-export/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                DesignExportError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        let token = match &config.access_token {
            Some(secret) => {
                let mut value =
                    HeaderValue::from_str(secret.expose_secret().as_ref()).map_err(|_| {
                        DesignExportError::Configuration(
                            "figma.access_token contains characters not allowed in a header"
                                .to_string(),
                        )
                    })?;
                value.set_sensitive(true);
                Some(value)
            }
            None => {
                tracing::warn!("No access token configured, requests will be anonymous");
                None
            }
        };

        let mut images_limiter =
            RateLimiter::new("tier1", config.rate_limit.tier1_requests_per_minute);
        let mut files_limiter =
            RateLimiter::new("tier2", config.rate_limit.tier2_requests_per_minute);
        if config.task_timeout_seconds > 0 {
            let timeout = Duration::from_secs(config.task_timeout_seconds);
            images_limiter = images_limiter.with_task_timeout(timeout);
            files_limiter = files_limiter.with_task_timeout(timeout);
        }

        tracing::debug!(
            base_url = %config.base_url,
            tier1_interval_ms = images_limiter.min_interval().as_millis() as u64,
            tier2_interval_ms = files_limiter.min_interval().as_millis() as u64,
            "Created design API client"
        );

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            token,
            images_limiter,
            files_limiter,
            retry: config.retry,
        })
    }

    /// Limiter used for image export calls
    pub fn images_limiter(&self) -> &RateLimiter {
        &self.images_limiter
    }

    /// Limiter used for file document calls
    pub fn files_limiter(&self) -> &RateLimiter {
        &self.files_limiter
    }

    /// GET `url` through `limiter`, retrying retryable failures with backoff
    ///
    /// Every attempt is scheduled through the limiter, so retries also
    /// respect the tier's spacing.
    async fn get_json<T>(
        &self,
        limiter: &RateLimiter,
        url: String,
        query: Vec<(&'static str, String)>,
    ) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let max_retries = self.retry.max_retries;
        let mut attempt = 0;

        loop {
            let http = self.http.clone();
            let token = self.token.clone();
            let request_url = url.clone();
            let request_query = query.clone();

            let outcome = limiter
                .schedule(move || execute_get::<T>(http, request_url, request_query, token))
                .await;

            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            let retryable = match &err {
                DesignExportError::Api(api_err) => api_err.is_retryable(),
                DesignExportError::Timeout(_) => true,
                _ => false,
            };
            let retry_after_secs = match &err {
                DesignExportError::Api(DesignApiError::RateLimitExceeded {
                    retry_after_secs,
                    ..
                }) => *retry_after_secs,
                _ => None,
            };

            attempt += 1;
            if !retryable || attempt > max_retries {
                return Err(err);
            }

            let delay = backoff_delay(&self.retry, attempt, retry_after_secs);
            crate::log_retry_attempt!(attempt, max_retries, err.to_string());
            tracing::debug!(
                tier = %limiter.tier(),
                url = %url,
                delay_ms = delay.as_millis() as u64,
                "Waiting before retry"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DesignApi for FigmaClient {
    async fn get_file(&self, file_key: &FileKey) -> Result<FileDocument> {
        let url = format!("{}/files/{}", self.base_url, file_key);
        tracing::info!(file_key = %file_key, "Fetching file document");

        let document: FileDocument = self.get_json(&self.files_limiter, url, Vec::new()).await?;

        if let Err(e) = document.validate() {
            tracing::error!(file_key = %file_key, error = %e, "Rejecting malformed document");
            return Err(e.into());
        }

        tracing::debug!(
            file_key = %file_key,
            name = %document.name,
            last_modified = ?document.last_modified,
            "Fetched file document"
        );
        Ok(document)
    }

    async fn get_images(
        &self,
        file_key: &FileKey,
        ids: &[NodeId],
        options: &ImageExportOptions,
    ) -> Result<ImagesResponse> {
        let url = format!("{}/images/{}", self.base_url, file_key);
        let joined = ids
            .iter()
            .map(NodeId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let query = vec![
            ("ids", joined),
            ("format", options.format.to_string()),
            ("scale", options.scale.to_string()),
        ];

        tracing::debug!(
            file_key = %file_key,
            id_count = ids.len(),
            format = %options.format,
            scale = options.scale,
            "Requesting image export"
        );

        self.get_json(&self.images_limiter, url, query).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

async fn execute_get<T: DeserializeOwned>(
    http: Client,
    url: String,
    query: Vec<(&'static str, String)>,
    token: Option<HeaderValue>,
) -> Result<T> {
    let mut request = http.get(&url);
    if !query.is_empty() {
        request = request.query(&query);
    }
    if let Some(token) = token {
        request = request.header(TOKEN_HEADER, token);
    }

    let resp = request.send().await.map_err(|e| {
        if e.is_timeout() {
            DesignApiError::Timeout(format!("{url}: {e}"))
        } else {
            DesignApiError::ConnectionFailed(format!("{url}: {e}"))
        }
    })?;

    let status = resp.status();
    if !status.is_success() {
        let retry_after_secs = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = resp.text().await.unwrap_or_default();
        return Err(status_error(status, retry_after_secs, body).into());
    }

    let body = resp.bytes().await.map_err(|e| {
        if e.is_timeout() {
            DesignApiError::Timeout(format!("{url}: {e}"))
        } else {
            DesignApiError::ConnectionFailed(format!("{url}: {e}"))
        }
    })?;

    decode_body(&body).map_err(|e| DesignApiError::InvalidResponse(format!("{url}: {e}")).into())
}

/// Decode a JSON body of any nesting depth
///
/// serde_json stops at 128 levels by default and each document node takes
/// two. The limit is lifted and the stack grows on demand instead.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> serde_json::Result<T> {
    let mut de = serde_json::Deserializer::from_slice(body);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Map a non-success status to the matching error, keeping the body verbatim
fn status_error(status: StatusCode, retry_after_secs: Option<u64>, body: String) -> DesignApiError {
    let code = status.as_u16();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DesignApiError::AuthenticationFailed {
            status: code,
            message: body,
        },
        StatusCode::TOO_MANY_REQUESTS => DesignApiError::RateLimitExceeded {
            retry_after_secs,
            message: body,
        },
        s if s.is_server_error() => DesignApiError::ServerError {
            status: code,
            message: body,
        },
        _ => DesignApiError::ClientError {
            status: code,
            message: body,
        },
    }
}

/// Exponential backoff for `attempt` (1-based), never shorter than Retry-After
fn backoff_delay(retry: &RetryConfig, attempt: usize, retry_after_secs: Option<u64>) -> Duration {
    let exponent = attempt.saturating_sub(1) as i32;
    let computed = retry.initial_delay_ms as f64 * retry.backoff_multiplier.powi(exponent);
    let delay_ms = (computed as u64).min(retry.max_delay_ms);
    let floor_ms = retry_after_secs.unwrap_or(0).saturating_mul(1000);
    Duration::from_millis(delay_ms.max(floor_ms))
}
