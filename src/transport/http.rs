use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::{Method, Params, Payload, ResponseMode, Transport};
use crate::config::ApiConfig;
use anyhow::{Context, Result, bail};

/// HTTP transport for the remote API
pub struct HttpTransport {
    client: Client,
    api_base: String,
    max_retry: u32,
    request_count: AtomicU64,
}

impl HttpTransport {
    /// Create a transport with the default [`ApiConfig`]
    pub fn new() -> Result<Self> {
        Self::with_config(&ApiConfig::default())
    }

    pub fn with_config(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            max_retry: config.max_retry,
            request_count: AtomicU64::new(0),
        })
    }

    /// Get total number of requests answered by the server
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Resolve a resource-relative URL against the API base
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.api_base, url)
        } else {
            format!("{}/{}", self.api_base, url)
        }
    }

    fn build(&self, method: Method, url: &str, params: &Params) -> RequestBuilder {
        match method {
            Method::Get if params.is_empty() => self.client.get(url),
            Method::Get => self.client.get(url).query(params),
            Method::Post => self.client.post(url).form(params),
        }
    }

    async fn send(&self, method: Method, url: &str, params: &Params) -> Result<Response> {
        let mut retry_count = 0;

        loop {
            match self.build(method, url, params).send().await {
                Ok(resp) => {
                    self.request_count.fetch_add(1, Ordering::Relaxed);
                    return Ok(resp);
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count >= self.max_retry {
                        return Err(e).with_context(|| {
                            format!("{method} {url} failed after {retry_count} attempts")
                        });
                    }
                    log::warn!(
                        "Connection error, retry {}/{}: {}",
                        retry_count,
                        self.max_retry,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        params: &Params,
        mode: ResponseMode,
    ) -> Result<Payload> {
        let url = self.resolve(url);
        log::debug!("{} {} {:?}", method, url, params);

        let resp = self.send(method, &url, params).await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("{method} {url} failed with status {status}: {body}");
        }

        match mode {
            ResponseMode::Headers => {
                let headers: BTreeMap<String, String> = resp
                    .headers()
                    .iter()
                    .filter_map(|(name, value)| {
                        value
                            .to_str()
                            .ok()
                            .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
                    })
                    .collect();
                Ok(Payload::Headers(headers))
            }
            ResponseMode::Body => {
                let body = resp
                    .json()
                    .await
                    .with_context(|| format!("{method} {url} did not return JSON"))?;
                Ok(Payload::Body(body))
            }
        }
    }

    fn api_base(&self) -> &str {
        &self.api_base
    }
}
