//! Card data model
//!
//! Suggestions, card groups and their sales history as returned by the lookup store.

mod types;

pub use types::*;
