//! HTTP Adapter
//!
//! JSON GET client shared by the market data adapters.

mod fetcher;

pub use fetcher::{build_url, decode_json, HttpConfig, HttpFetcher, DEFAULT_USER_AGENT};
