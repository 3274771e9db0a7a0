//! Lazy, offset-indexed access to paginated collections.
//!
//! A remote collection such as `/accounts/1/lists` is served a page at a
//! time. [`Collection`] hides that: callers index it by absolute offset or
//! walk it with [`Collection::next_entry`], and pages are fetched only when
//! an offset that has not been seen yet is touched.
//!
//! ## Architecture
//!
//! - [`cache`]: the two offset-keyed maps (raw payloads, materialized entries)
//! - [`page`]: page payload parsing and offset → page arithmetic
//! - [`remote`]: the collection itself, plus create, find and parent lookup
//!
//! ## Pagination
//!
//! The server's page size is not assumed. Every time a page must be fetched,
//! `ws.size` is read from the most recent pagination link and the page
//! holding the offset is computed from it:
//!
//! ```text
//! page_start = (offset / ws.size) * ws.size
//! GET {url}?ws.start={page_start}&ws.size={ws.size}
//! ```
//!
//! Entries of the response are keyed from the `start` the server reports,
//! not from the requested `ws.start`.

mod cache;
mod page;
mod remote;

pub use cache::OffsetCache;
pub use page::{CollectionPage, DEFAULT_PAGE_SIZE, PageRequest, page_size_from_link};
pub use remote::{Collection, ParentEntry};
