//! Cache module for storing raw HTTP responses to disk
//!
//! This module provides a whole-file JSON cache keyed by request URL, and a
//! fetcher that consults it before going to the network. There is no expiry:
//! once a response is stored it is served from disk on every later run.

mod fetcher;
mod store;

pub use fetcher::{CachedFetcher, FetchError, HttpTransport, Transport, DEFAULT_REQUEST_DELAY};
pub use store::{CacheMap, CacheStore, DEFAULT_CACHE_FILE};

#[cfg(test)]
pub(crate) use fetcher::ScriptedTransport;
