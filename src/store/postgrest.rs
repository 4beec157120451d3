//! PostgREST-backed lookup store

use super::{CardGroupFetch, SuggestionLookup};
use crate::cards::{CardGroup, Suggestion};
use crate::config::StoreSettings;
use crate::error::{Result, SearchError};
use crate::network::{ApiRequest, ApiResponse, HttpClient};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Client for a store exposing its `cards` table over PostgREST
#[derive(Clone)]
pub struct PostgrestStore {
    client: HttpClient,
    endpoint: String,
    api_key: Option<String>,
    suggestion_limit: usize,
    timeout: Duration,
}

impl PostgrestStore {
    pub fn new(client: HttpClient, settings: &StoreSettings) -> Self {
        let endpoint = format!(
            "{}/rest/v1/{}",
            settings.url.trim_end_matches('/'),
            settings.table
        );

        Self {
            client,
            endpoint,
            api_key: settings.api_key.clone(),
            suggestion_limit: settings.suggestion_limit,
            timeout: settings.timeout(),
        }
    }

    /// Table endpoint every query is issued against
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self) -> ApiRequest {
        let request = ApiRequest::get(&self.endpoint);
        match self.api_key {
            Some(ref key) => request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    async fn rows<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Vec<T>> {
        let response = self
            .client
            .execute_with_timeout(request, self.timeout)
            .await
            .map_err(|e| SearchError::Lookup(e.to_string()))?;

        Self::decode(&response)
    }

    fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<Vec<T>> {
        if !response.is_success() {
            return Err(SearchError::Lookup(response.summary()));
        }
        response
            .json()
            .map_err(|e| SearchError::Lookup(format!("malformed store response: {}", e)))
    }
}

#[async_trait]
impl SuggestionLookup for PostgrestStore {
    async fn find_suggestions(&self, term: &str) -> Result<Vec<Suggestion>> {
        let request = self
            .request()
            .param("select", "id,title,image_url")
            .param("title", format!("ilike.*{}*", term))
            .param("limit", self.suggestion_limit);

        let suggestions: Vec<Suggestion> = self.rows(request).await.map_err(|e| {
            warn!("Suggestion lookup for '{}' failed: {}", term, e);
            e
        })?;

        debug!("Store returned {} suggestions for '{}'", suggestions.len(), term);
        Ok(suggestions)
    }
}

#[async_trait]
impl CardGroupFetch for PostgrestStore {
    async fn fetch_card_group(&self, title: &str) -> Result<CardGroup> {
        // Two rows are enough to tell "unique" from "ambiguous".
        let request = self
            .request()
            .param("select", "*")
            .param("title", format!("eq.{}", title))
            .param("limit", 2);

        let mut groups: Vec<CardGroup> = self.rows(request).await?;

        if groups.len() != 1 {
            warn!(
                "Card group '{}' matched {} records, expected exactly one",
                title,
                groups.len()
            );
            return Err(SearchError::NotFound(title.to_string()));
        }

        let group = groups.remove(0);
        debug!("Loaded card group '{}' with {} sales", group.title, group.sale_count());
        Ok(group)
    }
}
