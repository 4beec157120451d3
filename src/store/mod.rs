//! Lookup store clients
//!
//! Suggestion lookups and exact card-group fetches against the store that
//! holds card groups and their sales history.

mod postgrest;

pub use postgrest::PostgrestStore;

use crate::cards::{CardGroup, Suggestion};
use crate::error::Result;
use async_trait::async_trait;

/// Substring lookup of card titles
#[async_trait]
pub trait SuggestionLookup: Send + Sync {
    /// Case-insensitive substring match on title, in store order, capped by
    /// the store's suggestion limit. Any term is accepted; length rules are
    /// the caller's concern.
    async fn find_suggestions(&self, term: &str) -> Result<Vec<Suggestion>>;
}

/// Exact-title fetch of one full card group
#[async_trait]
pub trait CardGroupFetch: Send + Sync {
    /// Fails with `NotFound` unless exactly one record carries `title`.
    async fn fetch_card_group(&self, title: &str) -> Result<CardGroup>;
}
