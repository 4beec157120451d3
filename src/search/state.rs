//! Search state owned by the orchestrator

use crate::cards::{CardGroup, Suggestion};
use crate::error::SearchError;
use serde::Serialize;

/// Tag attached to every issued client call
pub type RequestId = u64;

pub const MSG_LOADING: &str = "Loading...";
pub const MSG_SCRAPING: &str = "Fetching card data from resources...";
pub const MSG_NO_SUGGESTIONS: &str = "No suggestions found";
pub const HINT_NO_RESULTS: &str = "Press Enter or trigger a scrape to fetch sales data";

/// Hint shown while the query is too short to search
pub fn short_term_hint(min_term_length: usize) -> String {
    format!("Type at least {} characters", min_term_length)
}

/// Interaction phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Debouncing,
    Searching,
    HasSuggestions,
    NoResults,
    Scraping,
    SelectingCard,
    CardLoaded,
    Error,
}

impl Phase {
    /// Whether the phase is waiting on a timer or a client call
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            Self::Debouncing | Self::Searching | Self::Scraping | Self::SelectingCard
        )
    }
}

/// The scrape currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeTicket {
    pub id: RequestId,
    /// Set once the user moved on; the result is dropped on arrival.
    pub detached: bool,
}

/// Single source of truth for the search interaction.
///
/// Suggestions and the selected card group are never both populated, and
/// `error` is never shown alongside `message` or `hint`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub phase: Phase,
    pub suggestions: Vec<Suggestion>,
    pub selected_card_group: Option<CardGroup>,
    pub error: Option<SearchError>,
    pub message: Option<String>,
    pub hint: Option<String>,
    /// Authoritative lookup or card fetch; any other response is stale.
    pub pending_request: Option<RequestId>,
    pub scrape: Option<ScrapeTicket>,
    last_request_id: RequestId,
    revision: u64,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next request id; ids only ever grow.
    pub fn issue_request_id(&mut self) -> RequestId {
        self.last_request_id += 1;
        self.last_request_id
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }

    pub fn show_error(&mut self, error: SearchError) {
        self.error = Some(error);
        self.message = None;
        self.hint = None;
    }

    pub fn show_message(&mut self, message: impl Into<String>) {
        self.error = None;
        self.message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.error = None;
        self.message = None;
        self.hint = None;
    }

    /// Whether a non-detached scrape is running
    pub fn is_scraping(&self) -> bool {
        self.scrape.is_some_and(|t| !t.detached)
    }

    /// Whether a scrape, detached or not, still holds the single scrape slot
    pub fn scrape_slot_busy(&self) -> bool {
        self.scrape.is_some()
    }

    /// Read-only view for the presentation layer
    pub fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            revision: self.revision,
            intents: 0,
            query: self.query.clone(),
            phase: self.phase,
            suggestions: self.suggestions.clone(),
            selected_card_group: self.selected_card_group.clone(),
            error_message: self.error.as_ref().map(|e| e.user_message().to_string()),
            error: self.error.clone(),
            message: self.message.clone(),
            hint: self.hint.clone(),
            scraping: self.is_scraping(),
            scrape_slot_busy: self.scrape_slot_busy(),
        }
    }
}

/// What the presentation layer sees after every transition
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchSnapshot {
    pub revision: u64,
    /// User intents processed; filled in by the orchestrator
    pub intents: u64,
    pub query: String,
    pub phase: Phase,
    pub suggestions: Vec<Suggestion>,
    pub selected_card_group: Option<CardGroup>,
    pub error: Option<SearchError>,
    pub error_message: Option<String>,
    pub message: Option<String>,
    pub hint: Option<String>,
    /// A scrape for the current query is running
    pub scraping: bool,
    /// No new scrape can start until the running one resolves
    pub scrape_slot_busy: bool,
}

impl SearchSnapshot {
    /// No timer or client call is pending
    pub fn is_settled(&self) -> bool {
        !self.phase.is_pending()
    }
}
