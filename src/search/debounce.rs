//! Quiescence-window debouncer
//!
//! Values pushed into a [`Debouncer`] reach its output channel only once no
//! newer value has arrived for the whole window. A burst collapses to its
//! last value; intermediate values are never emitted.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

enum Signal<T> {
    Value(T),
    Cancel,
}

/// Handle to a running debounce task.
///
/// Dropping the handle aborts the task, discarding any pending value.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<Signal<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Start a debouncer that forwards settled values to `output`.
    pub fn spawn(window: Duration, output: mpsc::UnboundedSender<T>) -> Self {
        let (input, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(window, rx, output));
        Self { input, task }
    }

    /// Feed a new source value, restarting the window.
    pub fn push(&self, value: T) {
        // Fails only if the task has already exited; nothing left to notify.
        let _ = self.input.send(Signal::Value(value));
    }

    /// Discard the pending value, if any. Later pushes debounce normally.
    pub fn cancel(&self) {
        let _ = self.input.send(Signal::Cancel);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<T>(
    window: Duration,
    mut input: mpsc::UnboundedReceiver<Signal<T>>,
    output: mpsc::UnboundedSender<T>,
) {
    let mut pending: Option<T> = None;

    loop {
        let Some(value) = pending.take() else {
            match input.recv().await {
                Some(Signal::Value(value)) => pending = Some(value),
                Some(Signal::Cancel) => {}
                None => break,
            }
            continue;
        };

        tokio::select! {
            signal = input.recv() => match signal {
                Some(Signal::Value(newer)) => pending = Some(newer),
                Some(Signal::Cancel) => trace!("Pending debounce cancelled"),
                None => break,
            },
            _ = tokio::time::sleep(window) => {
                if output.send(value).is_err() {
                    break;
                }
            }
        }
    }
}
