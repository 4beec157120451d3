//! Events consumed and effects produced by the search state machine

use super::state::RequestId;
use crate::cards::{CardGroup, Suggestion};
use crate::error::SearchError;
use crate::scrape::ScrapeRequest;
use serde::{Deserialize, Serialize};

/// Intents the presentation layer may dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserEvent {
    /// The raw query changed
    Edit { term: String },
    /// A suggestion was picked
    Select { title: String },
    /// Explicit request to scrape the current query
    Scrape,
    /// Enter pressed
    Submit,
}

/// Everything that can move the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Edit(String),
    DebouncedTermChanged(String),
    SuggestionsResolved {
        request_id: RequestId,
        suggestions: Vec<Suggestion>,
    },
    SuggestionsFailed {
        request_id: RequestId,
        error: SearchError,
    },
    SuggestionSelected(String),
    Submit,
    ManualScrapeTrigger,
    ScrapeResolved {
        request_id: RequestId,
        count: usize,
    },
    ScrapeFailed {
        request_id: RequestId,
        error: SearchError,
    },
    CardGroupLoaded {
        request_id: RequestId,
        group: CardGroup,
    },
    CardGroupFailed {
        request_id: RequestId,
        error: SearchError,
    },
}

impl Event {
    /// Whether the event reports a failed client call
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::SuggestionsFailed { .. }
                | Event::ScrapeFailed { .. }
                | Event::CardGroupFailed { .. }
        )
    }
}

impl From<UserEvent> for Event {
    fn from(event: UserEvent) -> Self {
        match event {
            UserEvent::Edit { term } => Event::Edit(term),
            UserEvent::Select { title } => Event::SuggestionSelected(title),
            UserEvent::Scrape => Event::ManualScrapeTrigger,
            UserEvent::Submit => Event::Submit,
        }
    }
}

/// Side effects requested by a transition, executed by the runtime
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Feed the debouncer with the new raw query
    Debounce(String),
    /// Drop whatever the debouncer is holding
    CancelDebounce,
    FindSuggestions {
        request_id: RequestId,
        term: String,
    },
    FetchCardGroup {
        request_id: RequestId,
        title: String,
    },
    Scrape {
        request_id: RequestId,
        request: ScrapeRequest,
    },
}
