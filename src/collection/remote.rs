use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use url::form_urlencoded;

use super::cache::OffsetCache;
use super::page::{CollectionPage, DEFAULT_PAGE_SIZE, PageRequest, page_size_from_link};
use crate::error::{CollectionError, Result};
use crate::resource::{Entry, Response, get_json, path_of, post_for_headers, strip_api_base};
use crate::transport::{Params, Transport};

const WS_OP: &str = "ws.op";
const WS_SHOW_TOTAL_SIZE: &str = "ws.show=total_size";

/// Outcome of looking up the entry a collection hangs off
pub enum ParentEntry<T: Transport> {
    Found(Entry<T>),
    /// The collection sits at the top of the resource tree
    NoParentUrl,
    /// The parent URL answered with something other than a single entry
    NotAnEntry { url: String, reason: String },
}

impl<T: Transport> ParentEntry<T> {
    pub fn into_entry(self) -> Option<Entry<T>> {
        match self {
            ParentEntry::Found(entry) => Some(entry),
            _ => None,
        }
    }
}

/// A remote, paginated collection indexed by absolute offset
///
/// Entries are fetched one page at a time, only when an offset that has not
/// been seen yet is accessed, and materialized into [`Entry`] values once.
/// The collection is also a restartable cursor over all of its entries, see
/// [`Collection::next_entry`].
///
/// All mutation goes through `&mut self`; share a collection between tasks
/// only behind a lock.
pub struct Collection<T: Transport> {
    response: Response,
    transport: Arc<T>,
    total_size: usize,
    /// Rediscovered from `ws.size` every time a page is resolved
    page_size: usize,
    /// Most recent pagination link seen on any page
    pagination_link: Option<String>,
    cache: OffsetCache<Arc<Entry<T>>>,
    cursor: usize,
}

impl<T: Transport> Collection<T> {
    /// Build a collection from the payload of its first page.
    ///
    /// Every entry of `data` is keyed at its offset; no request is made.
    pub fn new(url: impl Into<String>, data: Value, transport: Arc<T>) -> Result<Self> {
        Self::from_parts(url.into(), data, transport, None)
    }

    /// Fetch `url` and build a collection from the response
    pub async fn load(transport: Arc<T>, url: &str) -> Result<Self> {
        let data = get_json(&*transport, url, &Params::new()).await?;
        Self::new(url, data, transport)
    }

    fn from_parts(
        url: String,
        data: Value,
        transport: Arc<T>,
        total_size: Option<usize>,
    ) -> Result<Self> {
        let page = CollectionPage::from_value(&data)?;
        let total_size = total_size.or(page.total_size).ok_or_else(|| {
            CollectionError::MalformedPayload(format!("{url} did not report total_size"))
        })?;

        let mut response = Response::new(url, data);
        response.set_field("total_size", Value::from(total_size));

        let pagination_link = page.pagination_link().map(str::to_string);
        let mut cache = OffsetCache::new(total_size);
        cache.key_page(page.start, page.entries);

        Ok(Self {
            response,
            transport,
            total_size,
            page_size: DEFAULT_PAGE_SIZE,
            pagination_link,
            cache,
            cursor: 0,
        })
    }

    pub fn url(&self) -> &str {
        self.response.url()
    }

    /// Payload of the page this collection was built from
    pub fn data(&self) -> &Value {
        self.response.data()
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.response.field(name)
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn len(&self) -> usize {
        self.total_size
    }

    pub fn is_empty(&self) -> bool {
        self.total_size == 0
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of offsets whose raw payload has been fetched
    pub fn loaded_len(&self) -> usize {
        self.cache.raw_len()
    }

    pub fn is_loaded(&self, offset: usize) -> bool {
        self.cache.contains_raw(offset)
    }

    /// The entry at `offset`, fetching its page if it has not been loaded.
    ///
    /// Repeated calls for the same offset return the same `Arc`.
    pub async fn get(&mut self, offset: usize) -> Result<Arc<Entry<T>>> {
        if offset >= self.total_size {
            return Err(CollectionError::OutOfRange {
                offset,
                total_size: self.total_size,
            });
        }

        if let Some(entry) = self.cache.materialized(offset) {
            log::trace!("{}[{}] served from cache", self.url(), offset);
            return Ok(Arc::clone(entry));
        }

        if !self.cache.contains_raw(offset) {
            self.load_page_for_offset(offset).await?;
        }
        self.materialize(offset)
    }

    async fn load_page_for_offset(&mut self, offset: usize) -> Result<()> {
        let page = self.page_for_offset(offset)?;
        log::debug!(
            "{}[{}] loading page ws.start={} ws.size={}",
            self.url(),
            offset,
            page.start,
            page.size
        );

        let data = get_json(&*self.transport, self.response.url(), &page.params()).await?;
        let fetched = CollectionPage::from_value(&data)?;
        if let Some(link) = fetched.pagination_link() {
            self.pagination_link = Some(link.to_string());
        }
        self.cache.key_page(fetched.start, fetched.entries);

        if !self.cache.contains_raw(offset) {
            return Err(CollectionError::OffsetNotReturned {
                offset,
                page_start: page.start,
                page_size: page.size,
            });
        }
        Ok(())
    }

    fn page_for_offset(&mut self, offset: usize) -> Result<PageRequest> {
        let link = self
            .pagination_link
            .as_deref()
            .ok_or(CollectionError::PaginationExhausted { offset })?;

        self.page_size = page_size_from_link(link)?;
        Ok(PageRequest::for_offset(offset, self.page_size))
    }

    fn materialize(&mut self, offset: usize) -> Result<Arc<Entry<T>>> {
        let raw = self
            .cache
            .raw(offset)
            .cloned()
            .ok_or(CollectionError::PaginationExhausted { offset })?;

        let self_link = raw.get("self_link").and_then(Value::as_str).ok_or_else(|| {
            CollectionError::MalformedPayload(format!(
                "entry at offset {offset} of {} has no self_link",
                self.url()
            ))
        })?;
        let url = strip_api_base(self_link, self.transport.api_base()).to_string();

        let entry = Arc::new(Entry::new(url, raw, Arc::clone(&self.transport))?);
        Ok(Arc::clone(self.cache.materialize(offset, entry)))
    }

    /// Advance the cursor and return the entry it passed over.
    ///
    /// Returns `Ok(None)` once every entry has been visited and rewinds, so
    /// the following call starts a new pass at offset 0.
    pub async fn next_entry(&mut self) -> Result<Option<Arc<Entry<T>>>> {
        if self.cursor < self.total_size {
            self.cursor += 1;
            return self.get(self.cursor - 1).await.map(Some);
        }
        self.cursor = 0;
        Ok(None)
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Run one full pass of [`next_entry`](Self::next_entry) from the start
    pub async fn collect_entries(&mut self) -> Result<Vec<Arc<Entry<T>>>> {
        self.rewind();
        let mut entries = Vec::with_capacity(self.total_size);
        while let Some(entry) = self.next_entry().await? {
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Create a new resource in this collection.
    ///
    /// POSTs `ws.op=create` with `fields`, then loads the resource named by
    /// the `location` header of the response.
    pub async fn create(&self, fields: Params) -> Result<Entry<T>> {
        let mut params = fields;
        params.insert(WS_OP.to_string(), "create".to_string());

        let headers = post_for_headers(&*self.transport, self.url(), &params).await?;
        let location = headers
            .get("location")
            .cloned()
            .ok_or(CollectionError::MissingLocation)?;
        log::debug!("{} created {}", self.url(), location);

        let data = get_json(&*self.transport, &location, &Params::new()).await?;
        Entry::new(location, data, Arc::clone(&self.transport))
    }

    /// Query this collection with `ws.op=find`.
    ///
    /// The find response does not reliably report `total_size`, so a second
    /// request with `ws.show=total_size` fetches the count the new
    /// collection is sized by.
    pub async fn find(&self, criteria: Params) -> Result<Collection<T>> {
        let mut params = criteria;
        params.insert(WS_OP.to_string(), "find".to_string());

        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        let separator = if self.url().contains('?') { '&' } else { '?' };
        let url = format!("{}{}{}", self.url(), separator, query);

        let data = get_json(&*self.transport, &url, &Params::new()).await?;
        let total_size = self.fetch_total_size(&url).await?;
        log::debug!("{} matched {} entries", url, total_size);

        Self::from_parts(url, data, Arc::clone(&self.transport), Some(total_size))
    }

    async fn fetch_total_size(&self, url: &str) -> Result<usize> {
        let count_url = format!("{url}&{WS_SHOW_TOTAL_SIZE}");
        let value = get_json(&*self.transport, &count_url, &Params::new()).await?;
        parse_total_size(&value)
    }

    /// Load an entry of this collection by its id rather than its offset
    pub async fn get_by_id(&self, id: impl fmt::Display) -> Result<Entry<T>> {
        let url = format!("{}/{}", path_of(self.url()), id);
        let data = get_json(&*self.transport, &url, &Params::new()).await?;
        Entry::new(url, data, Arc::clone(&self.transport))
    }

    /// URL of the entry this collection belongs to, `None` at the top of
    /// the tree
    pub fn parent_url(&self) -> Option<String> {
        let path = path_of(strip_api_base(self.url(), self.transport.api_base()));
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 3 {
            return None;
        }
        Some(format!("/{}", segments[..segments.len() - 1].join("/")))
    }

    pub async fn parent_entry(&self) -> Result<ParentEntry<T>> {
        let Some(url) = self.parent_url() else {
            return Ok(ParentEntry::NoParentUrl);
        };

        let data = get_json(&*self.transport, &url, &Params::new()).await?;
        match Entry::new(url.as_str(), data, Arc::clone(&self.transport)) {
            Ok(entry) => Ok(ParentEntry::Found(entry)),
            Err(CollectionError::NotAnEntry(reason)) => Ok(ParentEntry::NotAnEntry { url, reason }),
            Err(e) => Err(e),
        }
    }
}

/// A bare count: a non-negative integer, an integral float such as `2.0`, or
/// a string holding an integer
fn parse_total_size(value: &Value) -> Result<usize> {
    let size = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    size.and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| CollectionError::InvalidTotalSize(value.to_string()))
}

impl<T: Transport> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("url", &self.url())
            .field("total_size", &self.total_size)
            .field("page_size", &self.page_size)
            .field("loaded", &self.cache.raw_len())
            .field("materialized", &self.cache.materialized_len())
            .field("cursor", &self.cursor)
            .finish()
    }
}
