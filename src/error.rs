//! Error types returned by collections and entries.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CollectionError>;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("Offset {offset} does not exist (collection holds {total_size} entries)")]
    OutOfRange { offset: usize, total_size: usize },

    /// No pagination link is known but the offset has not been loaded. The
    /// reported `total_size` and the retrievable pages disagree.
    #[error("No further pages to resolve offset {offset}")]
    PaginationExhausted { offset: usize },

    #[error("Page at ws.start={page_start} ws.size={page_size} did not contain offset {offset}")]
    OffsetNotReturned {
        offset: usize,
        page_start: usize,
        page_size: usize,
    },

    #[error("Invalid pagination link: {0}")]
    InvalidPaginationLink(String),

    #[error("Invalid total size response: {0}")]
    InvalidTotalSize(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Create response did not include a location header")]
    MissingLocation,

    #[error("Payload is not an entry: {0}")]
    NotAnEntry(String),

    #[error("Transport returned the wrong kind of payload, expected {expected}")]
    UnexpectedPayload { expected: &'static str },

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl CollectionError {
    /// True for the faults that mean the server's pagination disagrees with
    /// the size it reported.
    pub fn is_integrity_fault(&self) -> bool {
        matches!(
            self,
            CollectionError::PaginationExhausted { .. } | CollectionError::OffsetNotReturned { .. }
        )
    }
}
