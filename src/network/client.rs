//! HTTP client wrapper - executes requests and reports raw responses

use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{FinalizedRequest, HttpMethod, RequestBody};

/// What came back over the wire, before any status policy is applied
#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
    pub time_ms: u64,
    pub size_bytes: usize,
}

/// The seam between the dispatcher and the HTTP library.
///
/// `method` is passed separately because the read path always issues a GET,
/// whatever method the request was drafted with.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, method: HttpMethod, request: &FinalizedRequest) -> Result<RawResponse>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        ReqwestTransport {
            client: create_client(timeout),
            timeout,
        }
    }

    fn build_request(&self, method: HttpMethod, request: &FinalizedRequest) -> reqwest::RequestBuilder {
        let mut req_builder = match method {
            HttpMethod::GET => self.client.get(&request.url),
            HttpMethod::POST => self.client.post(&request.url),
            HttpMethod::PUT => self.client.put(&request.url),
            HttpMethod::DELETE => self.client.delete(&request.url),
        };

        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        if method.has_body() {
            req_builder = match &request.body {
                Some(RequestBody::Json(value)) => req_builder.json(value),
                Some(RequestBody::Raw(text)) => req_builder.body(text.clone()),
                None => req_builder,
            };
        }

        req_builder
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, method: HttpMethod, request: &FinalizedRequest) -> Result<RawResponse> {
        let start = Instant::now();
        let result = self.build_request(method, request).send().await;

        let resp = result.map_err(|e| {
            if e.is_timeout() {
                anyhow!("Request timed out ({}s)", self.timeout.as_secs())
            } else if e.is_connect() {
                anyhow!("Connection failed: {}", e)
            } else {
                anyhow!("Request failed: {}", e)
            }
        })?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| anyhow!("Error reading body: {}", e))?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
            time_ms: start.elapsed().as_millis() as u64,
            size_bytes: bytes.len(),
        })
    }
}

/// Create an HTTP client with the configured timeout
pub fn create_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
