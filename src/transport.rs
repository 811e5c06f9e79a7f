use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use tracing::{debug, error, info};

use crate::error::RequestError;

/// Fixed per-request timeout (connect + headers + body).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// What the classifiers need from a completed GET.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    /// Value of the `Server` header, lossily decoded.
    pub fn server_header(&self) -> Option<String> {
        self.headers
            .get(reqwest::header::SERVER)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
    }
}

/// Issues one GET per call. No retries.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, RequestError>;
}

/// `reqwest`-backed transport with the fixed timeout and the client's default redirect policy.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self::from_client(client))
    }

    /// Wrap a preconfigured client (proxy settings, TLS options).
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, RequestError> {
        info!(url, "sending GET request");
        let resp = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                let e = RequestError::from(e);
                error!(url, "got request error: {e}");
                return Err(e);
            }
        };

        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp.text().await.map_err(|e| {
            let e = RequestError::from(e);
            error!(url, "failed reading body: {e}");
            e
        })?;
        debug!(url, status, "request complete");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
