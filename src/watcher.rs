//! The polling loop: one fetch-validate-extract-notify cycle at a time,
//! with change detection, duplicate suppression and capped backoff across
//! failing cycles.

use crate::api::StatusSource;
use crate::config::Config;
use crate::error::WatchError;
use crate::notify::Notifier;
use crate::status::{self, Submission};
use std::sync::Arc;
use std::time::Duration;

/// Mutable loop state. Owned by [`Watcher::run`] for the process
/// lifetime; nothing else touches it.
#[derive(Debug)]
pub struct PollState {
    /// Epoch-seconds lower bound for the next fetch. Advanced only from a
    /// successfully validated response.
    pub cursor: i64,
    pub last_notified: Option<crate::status::ReviewStatus>,
    pub backoff_secs: u64,
    /// Set once a failure notification has gone out for the current
    /// failing streak; cleared by the next successful cycle.
    pub failure_notified: bool,
}

impl PollState {
    /// Fresh state starting from "now": only submissions updated after
    /// process start are reported.
    pub fn new(initial_backoff_secs: u64) -> Self {
        Self::with_cursor(chrono::Utc::now().timestamp(), initial_backoff_secs)
    }

    pub fn with_cursor(cursor: i64, initial_backoff_secs: u64) -> Self {
        Self {
            cursor,
            last_notified: None,
            backoff_secs: initial_backoff_secs,
            failure_notified: false,
        }
    }
}

/// True iff the submission's status differs from the last one announced.
/// Pure: the caller updates `last_notified` after a successful send, which
/// keeps the decision and the side effect independently testable.
pub fn should_notify(state: &PollState, submission: &Submission) -> bool {
    state.last_notified != Some(submission.status)
}

/// What one successful cycle did, for callers that care (tests, logs).
#[derive(Debug, Clone, Copy)]
pub struct CycleReport {
    pub notified: bool,
    /// A status change was observed but its announcement failed to go
    /// out; the unchanged gate state retries it next cycle.
    pub delivery_failed: bool,
}

pub struct Watcher {
    source: Arc<dyn StatusSource>,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
    initial_backoff_secs: u64,
    max_backoff_secs: u64,
}

impl Watcher {
    pub fn new(source: Arc<dyn StatusSource>, notifier: Arc<dyn Notifier>, config: &Config) -> Self {
        Self {
            source,
            notifier,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            initial_backoff_secs: config.initial_backoff_secs.max(1),
            max_backoff_secs: config.max_backoff_secs.max(config.initial_backoff_secs),
        }
    }

    /// One full cycle. Any error leaves `cursor` untouched and is handled
    /// by the caller's failure path. A notifier delivery failure is NOT an
    /// error here: it is logged and the unchanged gate state re-announces
    /// the transition next cycle.
    pub async fn run_cycle(&self, state: &mut PollState) -> Result<CycleReport, WatchError> {
        let payload = self.source.fetch(state.cursor).await?;
        let feed = status::validate(&payload)?;

        let mut notified = false;
        let mut delivery_failed = false;
        match status::latest(&feed)? {
            Some(submission) => {
                if should_notify(state, &submission) {
                    let text = status::format_status_change(&submission);
                    match self.notifier.send(&text).await {
                        Ok(()) => {
                            state.last_notified = Some(submission.status);
                            notified = true;
                        }
                        Err(e) => {
                            delivery_failed = true;
                            tracing::warn!(
                                "status notification not delivered, will retry next cycle: {e}"
                            );
                        }
                    }
                } else {
                    tracing::info!("status unchanged ({}), nothing to announce", submission.status);
                }
            }
            None => tracing::info!("no submissions to report this cycle"),
        }

        if let Some(cursor) = feed.cursor {
            let cursor = i64::try_from(cursor).unwrap_or(i64::MAX);
            state.cursor = state.cursor.max(cursor);
        }

        state.backoff_secs = self.initial_backoff_secs;
        state.failure_notified = false;
        Ok(CycleReport {
            notified,
            delivery_failed,
        })
    }

    /// Failure path for one cycle: log with classification, surface the
    /// first failure of a streak over the notifier, return the sleep for
    /// this cycle and escalate the next one (doubling, capped).
    async fn handle_failure(&self, state: &mut PollState, err: &WatchError) -> Duration {
        tracing::error!(
            classification = err.classification(),
            "polling cycle failed: {err}"
        );

        if !state.failure_notified {
            state.failure_notified = true;
            let text = format!("Сбой в работе программы: {err}");
            if let Err(notify_err) = self.notifier.send(&text).await {
                tracing::warn!("failure notification not delivered: {notify_err}");
            }
        }

        let sleep = Duration::from_secs(state.backoff_secs);
        // Grow AFTER choosing this sleep so the first failure of a streak
        // waits the base interval.
        state.backoff_secs = state
            .backoff_secs
            .saturating_mul(2)
            .min(self.max_backoff_secs);
        sleep
    }

    /// Runs forever; shutdown is process-level (`main` races this against
    /// ctrl_c).
    pub async fn run(&self, mut state: PollState) {
        tracing::info!(
            interval_secs = self.poll_interval.as_secs(),
            cursor = state.cursor,
            "watcher started"
        );

        loop {
            let sleep = match self.run_cycle(&mut state).await {
                Ok(report) => {
                    if report.delivery_failed {
                        tracing::warn!(
                            "status change pending delivery, retrying in {}s",
                            self.poll_interval.as_secs()
                        );
                    } else if !report.notified {
                        tracing::info!(
                            "no change, next poll in {}s",
                            self.poll_interval.as_secs()
                        );
                    }
                    self.poll_interval
                }
                Err(err) => self.handle_failure(&mut state, &err).await,
            };
            tokio::time::sleep(sleep).await;
        }
    }
}
