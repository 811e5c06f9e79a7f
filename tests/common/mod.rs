#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, SERVER};
use websrv_scan_rs::transport::{HttpResponse, HttpTransport};
use websrv_scan_rs::RequestError;

pub const LISTING_BODY: &str = "<head><title>Index of /</title></head>";

/// Deterministic transport: answers by normalized URL, errors with connect-refused otherwise.
#[derive(Default)]
pub struct MockTransport {
    routes: HashMap<String, Result<HttpResponse, RequestError>>,
    calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, resp: HttpResponse) -> Self {
        self.routes.insert(url.to_string(), Ok(resp));
        self
    }

    pub fn fail(mut self, url: &str, err: RequestError) -> Self {
        self.routes.insert(url.to_string(), Err(err));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, RequestError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.routes
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(RequestError::Connect(format!("no route to {url}"))))
    }
}

pub fn response(status: u16, server: Option<&'static str>, body: &str) -> HttpResponse {
    let mut headers = HeaderMap::new();
    if let Some(s) = server {
        headers.insert(SERVER, HeaderValue::from_static(s));
    }
    HttpResponse {
        status,
        headers,
        body: body.to_string(),
    }
}
