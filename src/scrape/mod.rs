//! Scrape service client
//!
//! Asks the external scrape service to fetch and ingest fresh sales data
//! for a title. The service writes into the lookup store; callers re-query
//! the store afterwards.

mod service;

pub use service::ScrapeService;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Parameters of one scrape job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    /// Title to search marketplaces for
    pub query: String,
    /// Marketplace region
    pub region: String,
    /// Result page (1-indexed)
    pub page: u32,
}

impl ScrapeRequest {
    pub fn new(query: impl Into<String>, region: impl Into<String>, page: u32) -> Self {
        Self {
            query: query.into(),
            region: region.into(),
            page: page.max(1),
        }
    }
}

/// Trait for scrape backends
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Run a scrape job; returns the number of freshly ingested records.
    async fn scrape(&self, request: &ScrapeRequest) -> Result<usize>;
}
