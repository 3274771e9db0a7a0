//! # remote-collection
//!
//! Lazy, offset-indexed access to paginated REST collections.
//!
//! A collection exposed by a remote API (for example `/accounts/1/lists`)
//! is presented as a sequence of entries that can be indexed by offset and
//! iterated. Pages are fetched on demand using the `ws.start`/`ws.size`
//! pagination parameters, entries are cached by their absolute offset, and
//! nothing already retrieved is requested twice.
//!
//! ## Features
//!
//! - Indexed access to any offset, loading only the page that holds it
//! - Page size discovered from the server's pagination links
//! - Restartable iteration over the whole collection
//! - `ws.op=create` and `ws.op=find` with an authoritative match count
//! - Parent entry and child collection traversal
//! - Pluggable [`Transport`]: HTTP via reqwest, or in-memory for tests
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use remote_collection::{Collection, HttpTransport, params};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let transport = Arc::new(HttpTransport::new()?);
//!     let mut lists = Collection::load(transport, "/accounts/1/lists").await?;
//!
//!     // Offset access fetches the page holding offset 150 only
//!     let list = lists.get(150).await?;
//!     println!("{}", list.url());
//!
//!     // Walk every entry
//!     while let Some(entry) = lists.next_entry().await? {
//!         println!("{:?}", entry.str_field("name"));
//!     }
//!
//!     let weekly = lists.find(params([("name", "weekly")])).await?;
//!     println!("{} matches", weekly.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod resource;
pub mod transport;

pub use cli::Cli;
pub use collection::{Collection, ParentEntry};
pub use config::ApiConfig;
pub use error::{CollectionError, Result};
pub use resource::{Entry, Resource};
pub use transport::{
    HttpTransport, MemoryTransport, Method, Params, Payload, ResponseMode, Transport, params,
};
