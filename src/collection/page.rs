//! Page payloads and the offset → page arithmetic.

use serde::Deserialize;
use serde_json::Value;
use url::form_urlencoded;

use crate::error::{CollectionError, Result};
use crate::transport::Params;

/// Page size assumed until a pagination link says otherwise
pub const DEFAULT_PAGE_SIZE: usize = 100;

pub const WS_START: &str = "ws.start";
pub const WS_SIZE: &str = "ws.size";

/// One page of a collection as returned by the server
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionPage {
    pub start: usize,
    pub entries: Vec<Value>,
    pub total_size: Option<usize>,
    pub next_collection_link: Option<String>,
    pub prev_collection_link: Option<String>,
}

impl CollectionPage {
    pub fn from_value(data: &Value) -> Result<Self> {
        serde_json::from_value(data.clone())
            .map_err(|e| CollectionError::MalformedPayload(format!("not a collection page: {e}")))
    }

    /// The link page size is read from: the next page's, or on the last page
    /// the previous page's
    pub fn pagination_link(&self) -> Option<&str> {
        self.next_collection_link
            .as_deref()
            .or(self.prev_collection_link.as_deref())
    }
}

/// The `ws.start`/`ws.size` window of one page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub start: usize,
    pub size: usize,
}

impl PageRequest {
    /// The page of `page_size` entries holding `offset`
    pub fn for_offset(offset: usize, page_size: usize) -> Self {
        let page_number = offset / page_size;
        Self {
            start: page_number * page_size,
            size: page_size,
        }
    }

    pub fn params(&self) -> Params {
        let mut params = Params::new();
        params.insert(WS_START.to_string(), self.start.to_string());
        params.insert(WS_SIZE.to_string(), self.size.to_string());
        params
    }
}

/// Read `ws.size` from the query of a pagination link
pub fn page_size_from_link(link: &str) -> Result<usize> {
    let (_, query) = link
        .split_once('?')
        .ok_or_else(|| CollectionError::InvalidPaginationLink(format!("{link} has no query")))?;

    let size = form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == WS_SIZE)
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| CollectionError::InvalidPaginationLink(format!("{link} has no {WS_SIZE}")))?;

    match size.parse::<usize>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(CollectionError::InvalidPaginationLink(format!(
            "{link} has invalid {WS_SIZE}={size}"
        ))),
    }
}
