//! Worker queue for generation loops.
//!
//! [`BatchQueue`] runs one async operation per item with bounded
//! concurrency, a fixed pause between consecutive requests, optional
//! retries with exponential backoff, and cancellation through a
//! [`CancellationToken`]. A failing item never stops the rest of the run;
//! the outcome of every item is tallied in a [`BatchReport`].

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay between retries.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`BackoffConfig::max_delay`].
pub fn next_delay(current: Duration, config: &BackoffConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Items in flight at once. `1` runs the items strictly in order.
    pub concurrency: usize,
    /// Pause before each request of a slot after its first.
    pub delay: Duration,
    /// Extra attempts per failing item.
    pub retries: u32,
    pub backoff: BackoffConfig,
}

impl QueueConfig {
    /// One item at a time with `delay` between requests and no retries.
    pub fn sequential(delay: Duration) -> Self {
        Self {
            concurrency: 1,
            delay,
            retries: 0,
            backoff: BackoffConfig::default(),
        }
    }

    /// Sequential queue using the batch settings of a [`ClientConfig`].
    pub fn from_client(config: &ClientConfig) -> Self {
        Self {
            retries: config.batch_retries,
            ..Self::sequential(config.batch_delay())
        }
    }
}

/// One item that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// Debug rendering of the item.
    pub item: String,
    pub error: String,
}

/// Tally of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Items not run, or abandoned, because the run was cancelled.
    pub cancelled: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.cancelled
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.cancelled == 0
    }
}

enum Outcome {
    Succeeded,
    Failed(BatchFailure),
    Cancelled,
}

/// Cancellable worker queue. See the module docs.
pub struct BatchQueue {
    config: QueueConfig,
    cancel: CancellationToken,
}

impl BatchQueue {
    pub fn new(config: QueueConfig) -> Self {
        Self::with_cancel(config, CancellationToken::new())
    }

    /// Create a queue stopped by an externally owned token.
    pub fn with_cancel(config: QueueConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    /// Token that cancels this queue when triggered.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Run `op` once per item and report the outcome.
    ///
    /// Items are started in order. With a concurrency of 1 each item
    /// finishes before the next one starts.
    pub async fn run<I, F, Fut, T>(&self, label: &str, items: Vec<I>, op: F) -> BatchReport
    where
        I: Clone + Debug,
        F: Fn(I) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let total = items.len();
        tracing::info!(label, total, concurrency = self.config.concurrency, "Starting batch");

        let op = &op;
        let outcomes: Vec<Outcome> = stream::iter(items.into_iter().enumerate())
            .map(|(idx, item)| self.run_item(label, idx, item, op))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut report = BatchReport::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Succeeded => report.succeeded += 1,
                Outcome::Failed(failure) => {
                    report.failed += 1;
                    report.failures.push(failure);
                }
                Outcome::Cancelled => report.cancelled += 1,
            }
        }

        tracing::info!(
            label,
            succeeded = report.succeeded,
            failed = report.failed,
            cancelled = report.cancelled,
            "Batch finished",
        );
        report
    }

    async fn run_item<I, F, Fut, T>(&self, label: &str, idx: usize, item: I, op: &F) -> Outcome
    where
        I: Clone + Debug,
        F: Fn(I) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        if idx >= self.config.concurrency.max(1) && !self.config.delay.is_zero() {
            tokio::select! {
                _ = self.cancel.cancelled() => return Outcome::Cancelled,
                _ = tokio::time::sleep(self.config.delay) => {}
            }
        }

        let mut backoff = self.config.backoff.initial_delay;
        let mut attempt = 0u32;

        loop {
            if self.cancel.is_cancelled() {
                return Outcome::Cancelled;
            }
            attempt += 1;

            // A request that already finished counts, even if cancel fired
            // in the same poll.
            let result = tokio::select! {
                biased;
                result = op(item.clone()) => result,
                _ = self.cancel.cancelled() => return Outcome::Cancelled,
            };

            let err = match result {
                Ok(_) => {
                    tracing::debug!(label, ?item, attempt, "Batch item succeeded");
                    return Outcome::Succeeded;
                }
                Err(err) => err,
            };

            if attempt > self.config.retries {
                tracing::warn!(label, ?item, attempt, error = %err, "Batch item failed");
                return Outcome::Failed(BatchFailure {
                    item: format!("{item:?}"),
                    error: err.to_string(),
                });
            }

            tracing::warn!(
                label,
                ?item,
                attempt,
                delay_ms = backoff.as_millis() as u64,
                error = %err,
                "Batch item failed, retrying",
            );

            // Wait before the next attempt, respecting cancellation.
            tokio::select! {
                _ = self.cancel.cancelled() => return Outcome::Cancelled,
                _ = tokio::time::sleep(backoff) => {}
            }
            backoff = next_delay(backoff, &self.config.backoff);
        }
    }
}
