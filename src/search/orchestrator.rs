//! Async runtime around the search state machine
//!
//! One task owns the `SearchState`. User intents, debounced terms and client
//! results all arrive as events on that task and go through
//! `SearchRules::transition` one at a time; client calls run as separate
//! tasks and report back through a channel. Every processed event publishes
//! a fresh snapshot.

use super::debounce::Debouncer;
use super::event::{Effect, Event, UserEvent};
use super::machine::{Outcome, SearchRules};
use super::state::{SearchSnapshot, SearchState};
use crate::config::Settings;
use crate::metrics::{Metrics, Operation};
use crate::network::HttpClient;
use crate::scrape::{ScrapeService, Scraper};
use crate::store::{CardGroupFetch, PostgrestStore, SuggestionLookup};
use anyhow::{anyhow, bail, Result};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::debug;

/// Clients the orchestrator talks to
#[derive(Clone)]
pub struct Backends {
    pub lookup: Arc<dyn SuggestionLookup>,
    pub cards: Arc<dyn CardGroupFetch>,
    pub scraper: Arc<dyn Scraper>,
}

impl Backends {
    pub fn new(
        lookup: Arc<dyn SuggestionLookup>,
        cards: Arc<dyn CardGroupFetch>,
        scraper: Arc<dyn Scraper>,
    ) -> Self {
        Self {
            lookup,
            cards,
            scraper,
        }
    }

    /// PostgREST store for lookups and card fetches, HTTP scrape service
    pub fn from_settings(client: HttpClient, settings: &Settings) -> Self {
        let store = Arc::new(PostgrestStore::new(client.clone(), &settings.store));
        let scraper = Arc::new(ScrapeService::new(client, &settings.scrape));
        Self {
            lookup: store.clone(),
            cards: store,
            scraper,
        }
    }
}

/// Owner of the search state
pub struct Orchestrator {
    rules: SearchRules,
    state: SearchState,
    backends: Backends,
    debouncer: Debouncer<String>,
    debounced: mpsc::UnboundedReceiver<String>,
    results_tx: mpsc::UnboundedSender<Event>,
    results_rx: mpsc::UnboundedReceiver<Event>,
    intents: mpsc::UnboundedReceiver<UserEvent>,
    intents_processed: u64,
    snapshots: watch::Sender<SearchSnapshot>,
    metrics: Arc<Metrics>,
}

impl Orchestrator {
    /// Start the orchestrator task. It stops once every handle is dropped.
    pub fn spawn(
        backends: Backends,
        rules: SearchRules,
        debounce_window: Duration,
        metrics: Arc<Metrics>,
    ) -> OrchestratorHandle {
        let (intents_tx, intents) = mpsc::unbounded_channel();
        let (debounced_tx, debounced) = mpsc::unbounded_channel();
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        let state = SearchState::new();
        let (snapshots, snapshot_rx) = watch::channel(state.snapshot());

        let orchestrator = Self {
            rules,
            state,
            backends,
            debouncer: Debouncer::spawn(debounce_window, debounced_tx),
            debounced,
            results_tx,
            results_rx,
            intents,
            intents_processed: 0,
            snapshots,
            metrics,
        };
        tokio::spawn(orchestrator.run());

        OrchestratorHandle {
            intents: intents_tx,
            dispatched: Arc::new(Mutex::new(0)),
            snapshots: snapshot_rx,
        }
    }

    pub fn from_settings(
        backends: Backends,
        settings: &Settings,
        metrics: Arc<Metrics>,
    ) -> OrchestratorHandle {
        Self::spawn(
            backends,
            SearchRules::from_settings(settings),
            settings.search.debounce_window(),
            metrics,
        )
    }

    async fn run(mut self) {
        loop {
            let event = tokio::select! {
                intent = self.intents.recv() => match intent {
                    Some(intent) => {
                        self.intents_processed += 1;
                        Event::from(intent)
                    }
                    None => break,
                },
                Some(term) = self.debounced.recv() => Event::DebouncedTermChanged(term),
                Some(event) = self.results_rx.recv() => event,
            };
            self.apply(event);
        }
        debug!("Search orchestrator stopped");
    }

    fn apply(&mut self, event: Event) {
        let state = std::mem::take(&mut self.state);
        let transition = self.rules.transition(state, event);

        self.state = transition.state;
        self.state.bump_revision();

        match transition.outcome {
            Outcome::Applied => self.metrics.inc_applied(),
            Outcome::Stale => self.metrics.inc_stale(),
            Outcome::Rejected => {
                debug!("Event rejected in phase {:?}", self.state.phase);
                self.metrics.inc_rejected();
            }
        }

        for effect in transition.effects {
            self.execute(effect);
        }

        let mut snapshot = self.state.snapshot();
        snapshot.intents = self.intents_processed;
        self.snapshots.send_replace(snapshot);
    }

    fn execute(&self, effect: Effect) {
        match effect {
            Effect::Debounce(term) => self.debouncer.push(term),
            Effect::CancelDebounce => self.debouncer.cancel(),
            Effect::FindSuggestions { request_id, term } => {
                let lookup = Arc::clone(&self.backends.lookup);
                self.call(Operation::Lookup, async move {
                    match lookup.find_suggestions(&term).await {
                        Ok(suggestions) => Event::SuggestionsResolved {
                            request_id,
                            suggestions,
                        },
                        Err(error) => Event::SuggestionsFailed { request_id, error },
                    }
                });
            }
            Effect::FetchCardGroup { request_id, title } => {
                let cards = Arc::clone(&self.backends.cards);
                self.call(Operation::CardFetch, async move {
                    match cards.fetch_card_group(&title).await {
                        Ok(group) => Event::CardGroupLoaded { request_id, group },
                        Err(error) => Event::CardGroupFailed { request_id, error },
                    }
                });
            }
            Effect::Scrape {
                request_id,
                request,
            } => {
                let scraper = Arc::clone(&self.backends.scraper);
                self.call(Operation::Scrape, async move {
                    match scraper.scrape(&request).await {
                        Ok(count) => Event::ScrapeResolved { request_id, count },
                        Err(error) => Event::ScrapeFailed { request_id, error },
                    }
                });
            }
        }
    }

    /// Run a client call off the state-owning task and feed its result back.
    fn call<F>(&self, op: Operation, call: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        self.metrics.record_issued(op);
        let results = self.results_tx.clone();
        let metrics = Arc::clone(&self.metrics);

        tokio::spawn(async move {
            let started = Instant::now();
            let event = call.await;
            metrics.record_response_time(op, started.elapsed());
            if event.is_failure() {
                metrics.record_failure(op);
            }
            // Closed only when the orchestrator is gone.
            let _ = results.send(event);
        });
    }
}

/// Presentation-side handle: dispatches intents, reads snapshots
#[derive(Clone)]
pub struct OrchestratorHandle {
    intents: mpsc::UnboundedSender<UserEvent>,
    /// Intents sent through any clone of this handle
    dispatched: Arc<Mutex<u64>>,
    snapshots: watch::Receiver<SearchSnapshot>,
}

impl OrchestratorHandle {
    pub fn dispatch(&self, event: UserEvent) -> Result<()> {
        self.enqueue(event).map(|_| ())
    }

    /// Send an intent and return its position in the intent queue.
    fn enqueue(&self, event: UserEvent) -> Result<u64> {
        let mut dispatched = self
            .dispatched
            .lock()
            .map_err(|_| anyhow!("intent counter poisoned"))?;
        self.intents
            .send(event)
            .map_err(|_| anyhow!("search orchestrator has stopped"))?;
        *dispatched += 1;
        Ok(*dispatched)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SearchSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a snapshot satisfies `predicate`, for at most `timeout`.
    pub async fn wait_for<P>(&self, timeout: Duration, predicate: P) -> Result<SearchSnapshot>
    where
        P: FnMut(&SearchSnapshot) -> bool + Send,
    {
        let mut rx = self.snapshots.clone();
        let outcome = tokio::time::timeout(timeout, async move {
            rx.wait_for(predicate).await.map(|snapshot| snapshot.clone())
        })
        .await;

        match outcome {
            Ok(Ok(snapshot)) => Ok(snapshot),
            Ok(Err(_)) => bail!("search orchestrator has stopped"),
            Err(_) => bail!("timed out after {:?} waiting for search state", timeout),
        }
    }

    /// Dispatch `event`, then wait until it has been processed and no
    /// timer or client call is pending.
    pub async fn dispatch_and_settle(
        &self,
        event: UserEvent,
        timeout: Duration,
    ) -> Result<SearchSnapshot> {
        let ticket = self.enqueue(event)?;
        self.wait_for(timeout, move |s| s.intents >= ticket && s.is_settled())
            .await
    }
}
