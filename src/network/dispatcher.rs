//! Request dispatcher - the read path and the write path
//!
//! Reads are GETs cached under `("read", url)`. Concurrent reads of one key
//! share a single network call. Writes pick POST/PUT/DELETE from the
//! request's method and invalidate every cached read when they succeed.
//!
//! Any status other than exactly 200 is a failure, so 201 and 204 are
//! reported as errors too.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use futures_util::FutureExt;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::models::{ApiResponse, FinalizedRequest, HttpMethod};
use crate::network::cache::{QueryCache, QueryKey, ReadFuture};
use crate::network::client::{HttpTransport, RawResponse};

/// Session-scoped dispatcher. Clones share one cache.
#[derive(Clone)]
pub struct RequestDispatcher {
    transport: Arc<dyn HttpTransport>,
    cache: Arc<Mutex<QueryCache>>,
}

impl RequestDispatcher {
    pub fn new(transport: Arc<dyn HttpTransport>, stale_time: Duration) -> Self {
        Self::from_cache(transport, QueryCache::new(stale_time))
    }

    /// Like `new`, with an explicit eviction window for unused reads
    pub fn with_gc_time(
        transport: Arc<dyn HttpTransport>,
        stale_time: Duration,
        gc_time: Duration,
    ) -> Self {
        Self::from_cache(transport, QueryCache::with_gc_time(stale_time, gc_time))
    }

    fn from_cache(transport: Arc<dyn HttpTransport>, cache: QueryCache) -> Self {
        RequestDispatcher {
            transport,
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    /// Read through the cache: a fresh entry is returned without a call
    pub async fn fetch(&self, request: &FinalizedRequest) -> Result<ApiResponse> {
        self.read(request, false).await
    }

    /// Read bypassing freshness; joins an in-flight read of the same key
    pub async fn refetch(&self, request: &FinalizedRequest) -> Result<ApiResponse> {
        self.read(request, true).await
    }

    async fn read(&self, request: &FinalizedRequest, force: bool) -> Result<ApiResponse> {
        let key = QueryKey::read(&request.url);

        let call = {
            let mut cache = self.cache.lock().await;
            if !force {
                if let Some(hit) = cache.get_fresh(&key) {
                    cache.touch(&key);
                    tracing::debug!(url = %request.url, "Read served from cache");
                    return Ok(hit);
                }
            }
            match cache.in_flight(&key) {
                Some(call) => {
                    tracing::debug!(url = %request.url, "Joining in-flight read");
                    call
                }
                None => {
                    let call = self.read_call(request.clone());
                    cache.begin(key.clone(), call.clone());
                    call
                }
            }
        };

        let result = call.clone().await;

        let mut cache = self.cache.lock().await;
        cache.finish(&key, &call);
        match result {
            Ok(response) => {
                cache.store(key, response.clone());
                Ok(response)
            }
            Err(message) => Err(anyhow!(message)),
        }
    }

    fn read_call(&self, request: FinalizedRequest) -> ReadFuture {
        let transport = Arc::clone(&self.transport);
        async move {
            let raw = transport
                .send(HttpMethod::GET, &request)
                .await
                .map_err(|e| e.to_string())?;
            check_status(raw, &request.url).map_err(|e| e.to_string())
        }
        .boxed()
        .shared()
    }

    /// Write path. The verb comes from `request.method`; GET is rejected.
    pub async fn mutate(&self, request: &FinalizedRequest) -> Result<ApiResponse> {
        let method = match request.method {
            HttpMethod::GET => bail!("Unsupported method: {}", request.method),
            method => method,
        };

        let raw = self.transport.send(method, request).await?;
        let response = check_status(raw, &request.url)?;

        let invalidated = self.cache.lock().await.invalidate_all();
        tracing::debug!(url = %request.url, invalidated, "Write succeeded, cached reads invalidated");
        Ok(response)
    }

    /// What the cache holds for `url`, and whether it is stale. No network call.
    ///
    /// `url` becomes the observed key; other entries unused for the gc time
    /// are evicted.
    pub async fn lookup(&self, url: &str) -> (Option<ApiResponse>, bool) {
        let key = QueryKey::read(url);
        let mut cache = self.cache.lock().await;
        cache.touch(&key);
        let evicted = cache.evict_unused(&key);
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted unused cached reads");
        }
        (cache.get(&key).cloned(), cache.is_stale(&key))
    }

    /// Cached read for `url` regardless of freshness
    pub async fn cached(&self, url: &str) -> Option<ApiResponse> {
        self.cache.lock().await.get(&QueryKey::read(url)).cloned()
    }

    pub async fn is_stale(&self, url: &str) -> bool {
        self.cache.lock().await.is_stale(&QueryKey::read(url))
    }
}

/// Apply the status policy and decode the payload
pub fn check_status(raw: RawResponse, url: &str) -> Result<ApiResponse> {
    if raw.status != 200 {
        tracing::warn!(url, status = raw.status, "Non-200 status treated as failure");
        bail!("Cannot fetch data from {}", url);
    }

    let data = serde_json::from_str::<Value>(&raw.body).unwrap_or(Value::String(raw.body));
    Ok(ApiResponse {
        data,
        status: raw.status,
        status_text: raw.status_text,
        time_ms: raw.time_ms,
        size_bytes: raw.size_bytes,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport that replays canned responses and records every call
    #[derive(Default)]
    pub struct FakeTransport {
        pub calls: std::sync::Mutex<Vec<(HttpMethod, FinalizedRequest)>>,
        replies: std::sync::Mutex<VecDeque<Result<RawResponse, String>>>,
        pub count: AtomicUsize,
        pub delay: Option<Duration>,
    }

    impl FakeTransport {
        pub fn with_replies(replies: Vec<Result<RawResponse, String>>) -> Self {
            FakeTransport {
                replies: std::sync::Mutex::new(replies.into()),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<(HttpMethod, FinalizedRequest)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn send(&self, method: HttpMethod, request: &FinalizedRequest) -> Result<RawResponse> {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().unwrap().push((method, request.clone()));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(raw(200, r#"{"ok":true}"#)));
            reply.map_err(|message| anyhow!(message))
        }
    }

    pub fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            status_text: String::new(),
            body: body.to_string(),
            time_ms: 3,
            size_bytes: body.len(),
        }
    }

    fn dispatcher(transport: Arc<FakeTransport>) -> RequestDispatcher {
        RequestDispatcher::new(transport, Duration::from_secs(600))
    }

    #[test]
    fn test_status_201_is_an_error() {
        let err = check_status(raw(201, "{}"), "http://x/items").unwrap_err();
        assert_eq!(err.to_string(), "Cannot fetch data from http://x/items");
        assert!(check_status(raw(204, ""), "http://x").is_err());
        assert!(check_status(raw(200, ""), "http://x").is_ok());
    }

    #[test]
    fn test_non_json_payload_kept_as_string() {
        let response = check_status(raw(200, "plain text"), "http://x").unwrap();
        assert_eq!(response.data, Value::String("plain text".into()));
        let response = check_status(raw(200, r#"{"a":1}"#), "http://x").unwrap();
        assert_eq!(response.data, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_fetch_is_cached_per_url() {
        let transport = Arc::new(FakeTransport::default());
        let dispatcher = dispatcher(transport.clone());
        let a = FinalizedRequest::new(HttpMethod::GET, "http://x/a");
        let b = FinalizedRequest::new(HttpMethod::GET, "http://x/b");

        dispatcher.fetch(&a).await.unwrap();
        dispatcher.fetch(&a).await.unwrap();
        assert_eq!(transport.count.load(Ordering::SeqCst), 1);

        dispatcher.fetch(&b).await.unwrap();
        assert_eq!(transport.count.load(Ordering::SeqCst), 2);

        dispatcher.refetch(&a).await.unwrap();
        assert_eq!(transport.count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_get_read_sends_headers_and_no_body() {
        let transport = Arc::new(FakeTransport::default());
        let dispatcher = dispatcher(transport.clone());
        let request = FinalizedRequest::new(HttpMethod::GET, "https://api.github.com/users/octocat");

        dispatcher.refetch(&request).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, HttpMethod::GET);
        assert!(calls[0].1.headers.is_empty());
        assert!(calls[0].1.body.is_none());
    }

    #[tokio::test]
    async fn test_successful_write_invalidates_every_read() {
        let transport = Arc::new(FakeTransport::default());
        let dispatcher = dispatcher(transport.clone());
        let a = FinalizedRequest::new(HttpMethod::GET, "http://x/a");
        let b = FinalizedRequest::new(HttpMethod::GET, "http://x/b");
        dispatcher.fetch(&a).await.unwrap();
        dispatcher.fetch(&b).await.unwrap();

        let post = FinalizedRequest::new(HttpMethod::POST, "http://x/other");
        dispatcher.mutate(&post).await.unwrap();
        assert!(dispatcher.is_stale("http://x/a").await);
        assert!(dispatcher.is_stale("http://x/b").await);

        dispatcher.fetch(&a).await.unwrap();
        assert_eq!(transport.count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_cache() {
        let transport = Arc::new(FakeTransport::with_replies(vec![
            Ok(raw(200, "{}")),
            Ok(raw(201, "{}")),
        ]));
        let dispatcher = dispatcher(transport.clone());
        let a = FinalizedRequest::new(HttpMethod::GET, "http://x/a");
        dispatcher.fetch(&a).await.unwrap();

        let put = FinalizedRequest::new(HttpMethod::PUT, "http://x/a");
        assert!(dispatcher.mutate(&put).await.is_err());
        assert!(!dispatcher.is_stale("http://x/a").await);
    }

    #[tokio::test]
    async fn test_write_verb_follows_request_method() {
        let transport = Arc::new(FakeTransport::default());
        let dispatcher = dispatcher(transport.clone());

        for method in [HttpMethod::POST, HttpMethod::PUT, HttpMethod::DELETE] {
            dispatcher.mutate(&FinalizedRequest::new(method, "http://x")).await.unwrap();
        }
        let verbs: Vec<HttpMethod> = transport.calls().into_iter().map(|(m, _)| m).collect();
        assert_eq!(verbs, vec![HttpMethod::POST, HttpMethod::PUT, HttpMethod::DELETE]);
    }

    #[tokio::test]
    async fn test_write_with_get_is_unsupported() {
        let transport = Arc::new(FakeTransport::default());
        let dispatcher = dispatcher(transport.clone());

        let err = dispatcher
            .mutate(&FinalizedRequest::new(HttpMethod::GET, "http://x"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported method: GET");
        assert_eq!(transport.count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_error_surfaces_and_is_not_cached() {
        let transport = Arc::new(FakeTransport::with_replies(vec![Err(
            "Connection failed: refused".into(),
        )]));
        let dispatcher = dispatcher(transport.clone());
        let a = FinalizedRequest::new(HttpMethod::GET, "http://x/a");

        let err = dispatcher.fetch(&a).await.unwrap_err();
        assert_eq!(err.to_string(), "Connection failed: refused");
        assert!(dispatcher.cached("http://x/a").await.is_none());

        dispatcher.fetch(&a).await.unwrap();
        assert_eq!(transport.count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lookup_reports_cached_data_and_staleness() {
        let transport = Arc::new(FakeTransport::with_replies(vec![Ok(raw(
            200,
            r#"{"login":"octocat"}"#,
        ))]));
        let dispatcher = dispatcher(transport.clone());
        let a = FinalizedRequest::new(HttpMethod::GET, "http://x/a");

        assert_eq!(dispatcher.lookup("http://x/a").await, (None, true));

        dispatcher.fetch(&a).await.unwrap();
        let (data, stale) = dispatcher.lookup("http://x/a").await;
        assert_eq!(data.unwrap().data["login"], "octocat");
        assert!(!stale);

        dispatcher
            .mutate(&FinalizedRequest::new(HttpMethod::DELETE, "http://x/a"))
            .await
            .unwrap();
        let (data, stale) = dispatcher.lookup("http://x/a").await;
        assert!(data.is_some());
        assert!(stale);
        assert_eq!(transport.count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lookup_evicts_unused_reads() {
        let transport = Arc::new(FakeTransport::default());
        let dispatcher =
            RequestDispatcher::with_gc_time(transport, Duration::from_secs(600), Duration::ZERO);
        dispatcher.fetch(&FinalizedRequest::new(HttpMethod::GET, "http://x/a")).await.unwrap();
        dispatcher.fetch(&FinalizedRequest::new(HttpMethod::GET, "http://x/b")).await.unwrap();

        assert!(dispatcher.lookup("http://x/b").await.0.is_some());
        assert!(dispatcher.cached("http://x/a").await.is_none());
        assert!(dispatcher.cached("http://x/b").await.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_call() {
        let transport = Arc::new(FakeTransport {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let dispatcher = dispatcher(transport.clone());
        let a = FinalizedRequest::new(HttpMethod::GET, "http://x/a");

        let (first, second) = tokio::join!(dispatcher.refetch(&a), dispatcher.refetch(&a));
        assert_eq!(first.unwrap(), second.unwrap());
        assert_eq!(transport.count.load(Ordering::SeqCst), 1);
    }
}
