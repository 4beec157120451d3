//! HTTP networking module
//!
//! Provides the HTTP client used to reach the lookup store and the scrape service.

mod client;
mod request;

pub use client::HttpClient;
pub use request::{ApiRequest, ApiResponse};
