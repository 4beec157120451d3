//! Search orchestration module
//!
//! Turns raw query edits into debounced suggestion lookups, card group
//! fetches and scrape jobs, keeping a single authoritative `SearchState`.
//! Transitions are pure (`machine`); the async runtime lives in
//! `orchestrator`.

mod debounce;
mod event;
mod machine;
mod orchestrator;
mod state;

pub use debounce::Debouncer;
pub use event::{Effect, Event, UserEvent};
pub use machine::{transition, Outcome, SearchRules, Transition};
pub use orchestrator::{Backends, Orchestrator, OrchestratorHandle};
pub use state::*;
