//! Metrics collection module
//!
//! Tracks issued client calls, dropped responses, failures and response times.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// Number of response times kept per operation
const WINDOW: usize = 100;

/// Client call kinds issued by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Lookup,
    CardFetch,
    Scrape,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Self::Lookup => "lookup",
            Self::CardFetch => "card_fetch",
            Self::Scrape => "scrape",
        }
    }
}

/// Counters shared between the orchestrator and the web layer
pub struct Metrics {
    /// Events applied by the state machine
    pub events_applied: AtomicU64,
    /// Responses dropped by the staleness guard
    pub stale_dropped: AtomicU64,
    /// Events rejected in the current state
    pub rejected: AtomicU64,
    /// Calls issued per operation
    issued: RwLock<HashMap<Operation, u64>>,
    /// Failed calls per operation
    failures: RwLock<HashMap<Operation, u64>>,
    /// Response times per operation (last `WINDOW`, ms)
    response_times: RwLock<HashMap<Operation, Vec<u64>>>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            events_applied: AtomicU64::new(0),
            stale_dropped: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            issued: RwLock::new(HashMap::new()),
            failures: RwLock::new(HashMap::new()),
            response_times: RwLock::new(HashMap::new()),
        }
    }

    pub fn inc_applied(&self) {
        self.events_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_stale(&self) {
        self.stale_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an issued client call
    pub fn record_issued(&self, op: Operation) {
        if let Ok(mut issued) = self.issued.write() {
            *issued.entry(op).or_insert(0) += 1;
        }
    }

    /// Record a failed client call
    pub fn record_failure(&self, op: Operation) {
        if let Ok(mut failures) = self.failures.write() {
            *failures.entry(op).or_insert(0) += 1;
        }
    }

    /// Record how long a client call took
    pub fn record_response_time(&self, op: Operation, elapsed: Duration) {
        if let Ok(mut times) = self.response_times.write() {
            let entry = times.entry(op).or_default();
            if entry.len() >= WINDOW {
                entry.remove(0);
            }
            entry.push(elapsed.as_millis() as u64);
        }
    }

    pub fn issued(&self, op: Operation) -> u64 {
        self.issued
            .read()
            .ok()
            .and_then(|m| m.get(&op).copied())
            .unwrap_or(0)
    }

    pub fn failures(&self, op: Operation) -> u64 {
        self.failures
            .read()
            .ok()
            .and_then(|m| m.get(&op).copied())
            .unwrap_or(0)
    }

    /// Average response time for an operation
    pub fn avg_response_time(&self, op: Operation) -> Option<u64> {
        let times = self.response_times.read().ok()?;
        let t = times.get(&op)?;
        if t.is_empty() {
            None
        } else {
            Some(t.iter().sum::<u64>() / t.len() as u64)
        }
    }

    /// Point-in-time view of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        let operations = [Operation::Lookup, Operation::CardFetch, Operation::Scrape]
            .into_iter()
            .map(|op| {
                (
                    op.name().to_string(),
                    OperationStats {
                        issued: self.issued(op),
                        failures: self.failures(op),
                        avg_response_ms: self.avg_response_time(op),
                    },
                )
            })
            .collect();

        MetricsSnapshot {
            events_applied: self.events_applied.load(Ordering::Relaxed),
            stale_dropped: self.stale_dropped.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            operations,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics for a single operation
#[derive(Debug, Clone, Serialize)]
pub struct OperationStats {
    pub issued: u64,
    pub failures: u64,
    pub avg_response_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub events_applied: u64,
    pub stale_dropped: u64,
    pub rejected: u64,
    pub operations: HashMap<String, OperationStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = Metrics::new();

        metrics.record_issued(Operation::Lookup);
        metrics.record_issued(Operation::Lookup);
        metrics.record_failure(Operation::Scrape);
        metrics.record_response_time(Operation::Lookup, Duration::from_millis(100));
        metrics.record_response_time(Operation::Lookup, Duration::from_millis(300));
        metrics.inc_stale();

        assert_eq!(metrics.issued(Operation::Lookup), 2);
        assert_eq!(metrics.issued(Operation::Scrape), 0);
        assert_eq!(metrics.failures(Operation::Scrape), 1);
        assert_eq!(metrics.avg_response_time(Operation::Lookup), Some(200));
        assert_eq!(metrics.avg_response_time(Operation::CardFetch), None);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.stale_dropped, 1);
        assert_eq!(snapshot.operations["lookup"].issued, 2);
    }

    #[test]
    fn test_response_window_is_bounded() {
        let metrics = Metrics::new();
        for _ in 0..WINDOW {
            metrics.record_response_time(Operation::Scrape, Duration::from_millis(1000));
        }
        metrics.record_response_time(Operation::Scrape, Duration::from_millis(0));
        let avg = metrics.avg_response_time(Operation::Scrape).unwrap();
        assert!(avg < 1000);
    }
}
