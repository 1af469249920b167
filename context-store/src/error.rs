//! Store error kinds.
//!
//! `Unavailable` propagates to callers so the router can decide how to
//! degrade; `MalformedRecord` is handled inside read paths (the record is
//! skipped) and only surfaces from serialization of outgoing records.

use thiserror::Error;

/// Errors from the context store and its backends.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
    #[error("malformed record: {0}")]
    MalformedRecord(String),
}
