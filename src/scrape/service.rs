//! HTTP scrape service

use super::{ScrapeRequest, Scraper};
use crate::config::ScrapeSettings;
use crate::error::{Result, SearchError};
use crate::network::{ApiRequest, HttpClient};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

/// Response body: `{"result": [...]}`, one entry per ingested record
#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    result: Vec<serde_json::Value>,
}

/// Client for the scrape service's `scrape_cards` endpoint
#[derive(Clone)]
pub struct ScrapeService {
    client: HttpClient,
    url: String,
    timeout: Duration,
}

impl ScrapeService {
    pub fn new(client: HttpClient, settings: &ScrapeSettings) -> Self {
        let url = format!(
            "{}/{}",
            settings.base_url.trim_end_matches('/'),
            settings.endpoint.trim_start_matches('/')
        );

        Self {
            client,
            url,
            timeout: settings.timeout(),
        }
    }
}

#[async_trait]
impl Scraper for ScrapeService {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<usize> {
        info!(
            "Scraping '{}' (region {}, page {})",
            request.query, request.region, request.page
        );

        let api_request = ApiRequest::get(&self.url)
            .param("query", &request.query)
            .param("region", &request.region)
            .param("page", request.page);

        let response = self
            .client
            .execute_with_timeout(api_request, self.timeout)
            .await
            .map_err(|e| {
                warn!("Scrape request for '{}' failed: {}", request.query, e);
                SearchError::Scrape(e.to_string())
            })?;

        if !response.is_success() {
            warn!("Scrape service rejected '{}': {}", request.query, response.summary());
            return Err(SearchError::Scrape(response.summary()));
        }

        let body: ScrapeResponse = response
            .json()
            .map_err(|e| SearchError::Scrape(format!("malformed scrape response: {}", e)))?;

        info!("Scrape for '{}' ingested {} records", request.query, body.result.len());
        Ok(body.result.len())
    }
}
