use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{CollectionError, Result};
use crate::transport::{Method, Params, Payload, ResponseMode, Transport};

/// A resource URL together with the payload the server returned for it
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    url: String,
    data: Value,
}

impl Response {
    pub fn new(url: impl Into<String>, data: Value) -> Self {
        Self {
            url: url.into(),
            data,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Overwrite a top-level field, leaving non-object payloads untouched
    pub(crate) fn set_field(&mut self, name: &str, value: Value) {
        if let Some(object) = self.data.as_object_mut() {
            object.insert(name.to_string(), value);
        }
    }
}

/// Payloads carrying an `entries` list describe a collection
pub fn is_collection_payload(data: &Value) -> bool {
    data.get("entries").is_some_and(Value::is_array)
}

/// Turn an absolute link into the resource-relative URL under `api_base`
pub fn strip_api_base<'a>(link: &'a str, api_base: &str) -> &'a str {
    if api_base.is_empty() {
        return link;
    }
    link.strip_prefix(api_base).unwrap_or(link)
}

/// Path portion of a URL, without query string
pub fn path_of(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

pub(crate) async fn get_json<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
    params: &Params,
) -> Result<Value> {
    transport
        .request(Method::Get, url, params, ResponseMode::Body)
        .await?
        .into_body()
        .ok_or(CollectionError::UnexpectedPayload { expected: "body" })
}

pub(crate) async fn post_for_headers<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
    params: &Params,
) -> Result<BTreeMap<String, String>> {
    match transport
        .request(Method::Post, url, params, ResponseMode::Headers)
        .await?
    {
        Payload::Headers(headers) => Ok(headers),
        Payload::Body(_) => Err(CollectionError::UnexpectedPayload {
            expected: "headers",
        }),
    }
}
