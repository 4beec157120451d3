//! Pure transition function of the search state machine
//!
//! `SearchRules::transition` takes the current state and one event and
//! returns the next state plus the effects the runtime must perform. No I/O
//! happens here, so every rule is testable without timers or a network.

use super::event::{Effect, Event};
use super::state::{
    short_term_hint, Phase, RequestId, ScrapeTicket, SearchState, HINT_NO_RESULTS, MSG_LOADING,
    MSG_NO_SUGGESTIONS, MSG_SCRAPING,
};
use crate::cards::{CardGroup, Suggestion};
use crate::config::Settings;
use crate::error::SearchError;
use crate::scrape::ScrapeRequest;
use tracing::debug;

/// How an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Response to a superseded request; nothing visible changes.
    Stale,
    /// Event not allowed in the current state; state untouched.
    Rejected,
}

/// Result of applying one event
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: SearchState,
    pub effects: Vec<Effect>,
    pub outcome: Outcome,
}

impl Transition {
    fn applied(state: SearchState, effects: Vec<Effect>) -> Self {
        Self {
            state,
            effects,
            outcome: Outcome::Applied,
        }
    }

    fn stale(state: SearchState) -> Self {
        Self {
            state,
            effects: Vec::new(),
            outcome: Outcome::Stale,
        }
    }

    fn rejected(state: SearchState) -> Self {
        Self {
            state,
            effects: Vec::new(),
            outcome: Outcome::Rejected,
        }
    }
}

/// Tunables the transitions depend on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRules {
    pub min_term_length: usize,
    pub scrape_region: String,
    pub scrape_page: u32,
}

impl Default for SearchRules {
    fn default() -> Self {
        Self {
            min_term_length: crate::MIN_TERM_LENGTH,
            scrape_region: "uk".to_string(),
            scrape_page: 1,
        }
    }
}

impl SearchRules {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            min_term_length: settings.search.min_term_length,
            scrape_region: settings.scrape.region.clone(),
            scrape_page: settings.scrape.page,
        }
    }

    fn is_searchable(&self, term: &str) -> bool {
        term.chars().count() >= self.min_term_length
    }

    /// Apply one event to `state`.
    pub fn transition(&self, state: SearchState, event: Event) -> Transition {
        match event {
            Event::Edit(term) => self.edit(state, term),
            Event::DebouncedTermChanged(term) => self.debounced(state, term),
            Event::SuggestionsResolved {
                request_id,
                suggestions,
            } => self.suggestions_resolved(state, request_id, suggestions),
            Event::SuggestionsFailed { request_id, error } => {
                self.suggestions_failed(state, request_id, error)
            }
            Event::SuggestionSelected(title) => self.select(state, title),
            Event::Submit => {
                let first = state.suggestions.first().map(|s| s.title.clone());
                match first {
                    Some(title) => self.select(state, title),
                    None => self.trigger_scrape(state),
                }
            }
            Event::ManualScrapeTrigger => self.trigger_scrape(state),
            Event::ScrapeResolved { request_id, count } => {
                self.scrape_resolved(state, request_id, count)
            }
            Event::ScrapeFailed { request_id, error } => {
                self.scrape_failed(state, request_id, error)
            }
            Event::CardGroupLoaded { request_id, group } => {
                self.card_loaded(state, request_id, group)
            }
            Event::CardGroupFailed { request_id, error } => {
                self.card_failed(state, request_id, error)
            }
        }
    }

    fn edit(&self, mut state: SearchState, term: String) -> Transition {
        let len = term.chars().count();

        state.selected_card_group = None;
        state.suggestions.clear();
        state.clear_status();
        state.pending_request = None;
        if let Some(ticket) = state.scrape.as_mut() {
            ticket.detached = true;
        }
        if len > 0 && len < self.min_term_length {
            state.hint = Some(short_term_hint(self.min_term_length));
        }
        state.query = term.clone();
        state.phase = Phase::Debouncing;

        Transition::applied(state, vec![Effect::Debounce(term)])
    }

    fn debounced(&self, mut state: SearchState, term: String) -> Transition {
        // A selection or scrape may have taken over since the value was pushed.
        if state.phase != Phase::Debouncing || term != state.query {
            return Transition::stale(state);
        }

        if !self.is_searchable(&term) {
            state.phase = Phase::Idle;
            state.suggestions.clear();
            state.message = None;
            return Transition::applied(state, Vec::new());
        }

        let request_id = state.issue_request_id();
        state.pending_request = Some(request_id);
        state.phase = Phase::Searching;
        state.show_message(MSG_LOADING);
        state.hint = None;
        debug!("Lookup #{} for '{}'", request_id, term);

        Transition::applied(state, vec![Effect::FindSuggestions { request_id, term }])
    }

    fn suggestions_resolved(
        &self,
        mut state: SearchState,
        request_id: RequestId,
        suggestions: Vec<Suggestion>,
    ) -> Transition {
        if state.pending_request != Some(request_id) {
            debug!("Dropping stale suggestions for request #{}", request_id);
            return Transition::stale(state);
        }

        state.pending_request = None;
        state.selected_card_group = None;
        if suggestions.is_empty() {
            state.phase = Phase::NoResults;
            state.suggestions.clear();
            state.show_message(MSG_NO_SUGGESTIONS);
            state.hint = Some(HINT_NO_RESULTS.to_string());
        } else {
            state.phase = Phase::HasSuggestions;
            state.suggestions = suggestions;
            state.clear_status();
        }

        Transition::applied(state, Vec::new())
    }

    fn suggestions_failed(
        &self,
        mut state: SearchState,
        request_id: RequestId,
        error: SearchError,
    ) -> Transition {
        if state.pending_request != Some(request_id) {
            debug!("Dropping stale lookup failure for request #{}", request_id);
            return Transition::stale(state);
        }

        state.pending_request = None;
        state.suggestions.clear();
        state.phase = Phase::Error;
        state.show_error(error);

        Transition::applied(state, Vec::new())
    }

    fn select(&self, mut state: SearchState, title: String) -> Transition {
        if title.trim().is_empty() {
            return Transition::rejected(state);
        }

        let request_id = state.issue_request_id();
        state.pending_request = Some(request_id);
        state.suggestions.clear();
        state.selected_card_group = None;
        if let Some(ticket) = state.scrape.as_mut() {
            ticket.detached = true;
        }
        state.query = title.clone();
        state.phase = Phase::SelectingCard;
        state.show_message(MSG_LOADING);
        state.hint = None;
        debug!("Card fetch #{} for '{}'", request_id, title);

        Transition::applied(
            state,
            vec![
                Effect::CancelDebounce,
                Effect::FetchCardGroup { request_id, title },
            ],
        )
    }

    fn trigger_scrape(&self, mut state: SearchState) -> Transition {
        if state.scrape_slot_busy()
            || state.phase == Phase::SelectingCard
            || !self.is_searchable(&state.query)
        {
            return Transition::rejected(state);
        }

        let request_id = state.issue_request_id();
        state.scrape = Some(ScrapeTicket {
            id: request_id,
            detached: false,
        });
        // The scrape re-queries on completion; an older lookup is moot.
        state.pending_request = None;
        // A re-scrape from a loaded card replaces its sales history.
        state.selected_card_group = None;
        state.phase = Phase::Scraping;
        state.show_message(MSG_SCRAPING);
        state.hint = None;

        let request = ScrapeRequest::new(
            state.query.clone(),
            self.scrape_region.clone(),
            self.scrape_page,
        );

        Transition::applied(
            state,
            vec![Effect::CancelDebounce, Effect::Scrape { request_id, request }],
        )
    }

    /// Release the scrape slot; `None` means the result must be dropped.
    fn finish_scrape(state: &mut SearchState, request_id: RequestId) -> Option<ScrapeTicket> {
        match state.scrape {
            Some(ticket) if ticket.id == request_id => {
                state.scrape = None;
                (!ticket.detached).then_some(ticket)
            }
            _ => None,
        }
    }

    fn scrape_resolved(
        &self,
        mut state: SearchState,
        request_id: RequestId,
        count: usize,
    ) -> Transition {
        if Self::finish_scrape(&mut state, request_id).is_none() {
            debug!("Dropping result of detached scrape #{}", request_id);
            return Transition::stale(state);
        }

        if count == 0 {
            state.phase = if state.suggestions.is_empty() {
                Phase::NoResults
            } else {
                Phase::HasSuggestions
            };
            state.show_error(SearchError::NoRecordsScraped);
            return Transition::applied(state, Vec::new());
        }

        let lookup_id = state.issue_request_id();
        state.pending_request = Some(lookup_id);
        state.phase = Phase::Searching;
        state.show_message(MSG_LOADING);
        debug!(
            "Scrape #{} ingested {} records, lookup #{} for '{}'",
            request_id, count, lookup_id, state.query
        );

        let term = state.query.clone();
        Transition::applied(
            state,
            vec![Effect::FindSuggestions {
                request_id: lookup_id,
                term,
            }],
        )
    }

    fn scrape_failed(
        &self,
        mut state: SearchState,
        request_id: RequestId,
        error: SearchError,
    ) -> Transition {
        if Self::finish_scrape(&mut state, request_id).is_none() {
            debug!("Dropping failure of detached scrape #{}", request_id);
            return Transition::stale(state);
        }

        state.phase = Phase::Error;
        state.show_error(error);
        Transition::applied(state, Vec::new())
    }

    fn card_loaded(
        &self,
        mut state: SearchState,
        request_id: RequestId,
        group: CardGroup,
    ) -> Transition {
        if state.pending_request != Some(request_id) {
            debug!("Dropping stale card group for request #{}", request_id);
            return Transition::stale(state);
        }

        state.pending_request = None;
        state.suggestions.clear();
        state.selected_card_group = Some(group);
        state.phase = Phase::CardLoaded;
        state.clear_status();
        Transition::applied(state, Vec::new())
    }

    fn card_failed(
        &self,
        mut state: SearchState,
        request_id: RequestId,
        error: SearchError,
    ) -> Transition {
        if state.pending_request != Some(request_id) {
            debug!("Dropping stale card failure for request #{}", request_id);
            return Transition::stale(state);
        }

        state.pending_request = None;
        state.selected_card_group = None;
        state.phase = Phase::Error;
        state.show_error(error);
        Transition::applied(state, Vec::new())
    }
}

/// Apply one event with the default rules.
pub fn transition(state: SearchState, event: Event) -> Transition {
    SearchRules::default().transition(state, event)
}
