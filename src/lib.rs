//! Cardsales-RS: card sales search for collectible trading cards
//!
//! Turns what a user types into debounced suggestion lookups against a
//! PostgREST store, loads a title's sales history on selection, and can ask
//! an external scrape service to ingest fresh sales data for a query.

pub mod cards;
pub mod config;
pub mod error;
pub mod metrics;
pub mod network;
pub mod scrape;
pub mod search;
pub mod store;
pub mod web;

pub use cards::{CardGroup, CardId, SoldCard, Suggestion};
pub use config::Settings;
pub use error::SearchError;
pub use search::{Backends, Orchestrator, OrchestratorHandle, SearchSnapshot, UserEvent};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timeout for store requests in seconds
pub const DEFAULT_TIMEOUT: u64 = 5;

/// Default timeout for scrape jobs in seconds
pub const SCRAPE_TIMEOUT: u64 = 60;

/// Quiet period before a query edit triggers a lookup, in milliseconds
pub const DEBOUNCE_MS: u64 = 500;

/// Shortest query that is looked up or scraped
pub const MIN_TERM_LENGTH: usize = 3;

/// Maximum number of suggestions per lookup
pub const SUGGESTION_LIMIT: usize = 20;
