//! Error taxonomy for the search flow.

use serde::Serialize;
use thiserror::Error;

/// Failures surfaced by the lookup store, the scrape service, or the
/// orchestration around them.
///
/// Values are kept inside `SearchState`, so the type is cheap to clone and
/// comparable in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SearchError {
    /// Transport or store error during a suggestion or card-group query.
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// Transport or service error while triggering a scrape.
    #[error("scrape failed: {0}")]
    Scrape(String),

    /// Card-group query matched zero or more than one record.
    #[error("no unique card group titled '{0}'")]
    NotFound(String),

    /// The scrape completed but ingested nothing.
    #[error("no records found by scrape")]
    NoRecordsScraped,
}

impl SearchError {
    /// Human-readable category shown in place of a status message.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Lookup(_) => "Failed to load search suggestions",
            Self::Scrape(_) => "Failed to fetch card data from resources",
            Self::NotFound(_) => "Failed to retrieve card data from database",
            Self::NoRecordsScraped => "No records found by scrape",
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
