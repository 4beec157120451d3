//! Web server module
//!
//! Exposes one search session over HTTP: an HTML page driven by form posts
//! and a small JSON API over the same orchestrator.

mod handlers;
mod routes;
mod state;
mod templates;

pub use routes::create_router;
pub use state::AppState;
pub use templates::Templates;
