//! Resources returned by the remote API.
//!
//! Every payload the API returns is either a single item ([`Entry`]) or a
//! page of a collection. [`Response`] is the URL + payload pair both are
//! built on, and [`load`] fetches a URL and decides which of the two it got.

mod entry;
mod response;

pub use entry::Entry;
pub use response::{Response, is_collection_payload, path_of, strip_api_base};
pub(crate) use response::{get_json, post_for_headers};

use std::sync::Arc;

use crate::collection::Collection;
use crate::error::Result;
use crate::transport::{Params, Transport};

/// Whatever a resource URL turned out to point at
pub enum Resource<T: Transport> {
    Collection(Collection<T>),
    Entry(Entry<T>),
}

impl<T: Transport> Resource<T> {
    pub fn url(&self) -> &str {
        match self {
            Resource::Collection(collection) => collection.url(),
            Resource::Entry(entry) => entry.url(),
        }
    }

    pub fn into_collection(self) -> Option<Collection<T>> {
        match self {
            Resource::Collection(collection) => Some(collection),
            Resource::Entry(_) => None,
        }
    }

    pub fn into_entry(self) -> Option<Entry<T>> {
        match self {
            Resource::Entry(entry) => Some(entry),
            Resource::Collection(_) => None,
        }
    }
}

/// Fetch `url` and wrap the payload as a collection or an entry
pub async fn load<T: Transport>(transport: Arc<T>, url: &str) -> Result<Resource<T>> {
    let data = get_json(&*transport, url, &Params::new()).await?;
    if is_collection_payload(&data) {
        Ok(Resource::Collection(Collection::new(url, data, transport)?))
    } else {
        Ok(Resource::Entry(Entry::new(url, data, transport)?))
    }
}
