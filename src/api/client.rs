//! HTTP client for the message service
//!
//! Wraps reqwest::Client with base-URL handling, status checking and JSON
//! decoding for GET and body-less POST requests.

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// Per-request timeout (connect + read).
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client bound to one message service base URL.
#[derive(Clone)]
pub struct MessagesClient {
    http: reqwest::Client,
    base_url: String,
}

impl MessagesClient {
    /// Build a client for `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ApiError::Transport {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `path` with the given query parameters.
    pub fn url(&self, path: &str, query: &[(&str, String)]) -> Result<url::Url, ApiError> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = url::Url::parse(&raw).map_err(|_| ApiError::Url(raw.clone()))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.request_json(Method::GET, path, query).await
    }

    /// POST to `path` without a body and decode the JSON answer.
    pub async fn post_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request_json(Method::POST, path, &[]).await
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path, query)?;
        let url_str = url.to_string();
        tracing::debug!("{} {}", method, url_str);

        let resp = self
            .http
            .request(method, url)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url_str.clone(),
                source,
            })?;

        let resp = check_response(resp, &url_str).await?;
        let body = resp.text().await.map_err(|source| ApiError::Transport {
            url: url_str.clone(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: url_str,
            source,
        })
    }
}

/// Check HTTP response status code and return a typed error on failure.
async fn check_response(resp: reqwest::Response, url: &str) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!("HTTP {} for {}: {}", status.as_u16(), url, body);
        return Err(ApiError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}
