use anyhow::{Result, anyhow};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use super::{Method, Params, Payload, ResponseMode, Transport};
use crate::config::DEFAULT_API_BASE;

/// A request seen by [`MemoryTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub params: Params,
    pub mode: ResponseMode,
}

type RouteKey = (Method, String, Params);

/// In-memory transport serving canned payloads
///
/// Responses are matched on method, URL and parameters exactly. Every
/// request is recorded, answered or not, so callers can assert on the
/// traffic a collection produced.
pub struct MemoryTransport {
    api_base: String,
    routes: Mutex<HashMap<RouteKey, Payload>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            routes: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer `method url` with `params` by `payload`, replacing any
    /// previous answer for the same request
    pub fn respond(&self, method: Method, url: &str, params: Params, payload: Payload) {
        self.routes
            .lock()
            .insert((method, url.to_string(), params), payload);
    }

    /// Answer a parameterless GET with a JSON body
    pub fn respond_get(&self, url: &str, body: Value) {
        self.respond(Method::Get, url, Params::new(), Payload::Body(body));
    }

    pub fn respond_get_with(&self, url: &str, params: Params, body: Value) {
        self.respond(Method::Get, url, params, Payload::Body(body));
    }

    pub fn respond_post_headers(
        &self,
        url: &str,
        params: Params,
        headers: BTreeMap<String, String>,
    ) {
        self.respond(Method::Post, url, params, Payload::Headers(headers));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        params: &Params,
        mode: ResponseMode,
    ) -> Result<Payload> {
        self.requests.lock().push(RecordedRequest {
            method,
            url: url.to_string(),
            params: params.clone(),
            mode,
        });

        let key = (method, url.to_string(), params.clone());
        self.routes
            .lock()
            .get(&key)
            .cloned()
            .ok_or_else(|| anyhow!("No response registered for {method} {url} {params:?}"))
    }

    fn api_base(&self) -> &str {
        &self.api_base
    }
}
