mod http;
mod memory;

pub use http::HttpTransport;
pub use memory::{MemoryTransport, RecordedRequest};

use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::config::DEFAULT_API_BASE;

/// Request parameters, sent as the query string for GET and as a form body
/// for POST
pub type Params = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller wants back from a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// The parsed JSON body
    #[default]
    Body,
    /// The response headers, names lowercased
    Headers,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Body(Value),
    Headers(BTreeMap<String, String>),
}

impl Payload {
    pub fn into_body(self) -> Option<Value> {
        match self {
            Payload::Body(value) => Some(value),
            Payload::Headers(_) => None,
        }
    }

    pub fn into_headers(self) -> Option<BTreeMap<String, String>> {
        match self {
            Payload::Headers(headers) => Some(headers),
            Payload::Body(_) => None,
        }
    }
}

/// Trait for performing requests against the remote API
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request and return the part of the response `mode` asks for
    async fn request(
        &self,
        method: Method,
        url: &str,
        params: &Params,
        mode: ResponseMode,
    ) -> Result<Payload>;

    /// Prefix stripped from absolute links to obtain resource-relative URLs
    fn api_base(&self) -> &str {
        DEFAULT_API_BASE
    }
}

/// Build a [`Params`] map from string pairs.
pub fn params<K, V, I>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
