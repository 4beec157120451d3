//! Application state shared across handlers

use crate::config::Settings;
use crate::metrics::Metrics;
use crate::search::OrchestratorHandle;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Handle to the search orchestrator
    pub search: OrchestratorHandle,
    /// Shared counters
    pub metrics: Arc<Metrics>,
    /// Template renderer
    pub templates: Arc<super::Templates>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        settings: Settings,
        search: OrchestratorHandle,
        metrics: Arc<Metrics>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            settings: Arc::new(settings),
            search,
            metrics,
            templates: Arc::new(super::Templates::new()?),
        })
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }

    /// Longest a form post waits for the search to settle: a debounce, a
    /// scrape and the two store calls around it.
    pub fn settle_timeout(&self) -> Duration {
        self.settings.search.debounce_window()
            + self.settings.scrape.timeout()
            + self.settings.store.timeout() * 2
    }
}
