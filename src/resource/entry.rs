use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::response::{Response, is_collection_payload, strip_api_base};
use crate::collection::Collection;
use crate::error::{CollectionError, Result};
use crate::transport::Transport;

/// One item of a remote collection
pub struct Entry<T: Transport> {
    response: Response,
    transport: Arc<T>,
}

impl<T: Transport> Entry<T> {
    /// Wrap the payload of a single resource.
    ///
    /// Fails with [`CollectionError::NotAnEntry`] when `data` is not a JSON
    /// object or describes a collection.
    pub fn new(url: impl Into<String>, data: Value, transport: Arc<T>) -> Result<Self> {
        let url = url.into();
        if !data.is_object() {
            return Err(CollectionError::NotAnEntry(format!(
                "{url} returned a non-object payload"
            )));
        }
        if is_collection_payload(&data) {
            return Err(CollectionError::NotAnEntry(format!(
                "{url} returned a collection"
            )));
        }

        Ok(Self {
            response: Response::new(url, data),
            transport,
        })
    }

    pub fn url(&self) -> &str {
        self.response.url()
    }

    pub fn data(&self) -> &Value {
        self.response.data()
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.response.field(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.response.str_field(name)
    }

    pub fn id(&self) -> Option<&Value> {
        self.field("id")
    }

    /// Load the collection this entry links to through `{name}_collection_link`
    pub async fn child_collection(&self, name: &str) -> Result<Collection<T>> {
        let key = format!("{name}_collection_link");
        let link = self.str_field(&key).ok_or_else(|| {
            CollectionError::MalformedPayload(format!("{} has no {key}", self.url()))
        })?;
        let url = strip_api_base(link, self.transport.api_base()).to_string();
        Collection::load(Arc::clone(&self.transport), &url).await
    }
}

impl<T: Transport> fmt::Debug for Entry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("url", &self.url())
            .field("data", self.data())
            .finish()
    }
}
