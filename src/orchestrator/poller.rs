//! Status poll loop
//!
//! One loop per tracked job. Ticks are sequential, so at most one status
//! request is in flight and responses are applied in request order. Every
//! state write goes through [`Shared::apply`], which drops writes from a
//! session that has been cancelled or superseded.

use super::state::JobState;
use crate::error::{Error, JobFailure, ServiceError};
use crate::job::JobStatus;
use crate::service::{JobService, JobStatusReport};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Poll cadence and failure tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_consecutive_errors: u32,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(crate::config::DEFAULT_POLL_INTERVAL_SECS),
            max_consecutive_errors: crate::config::DEFAULT_MAX_CONSECUTIVE_ERRORS,
        }
    }
}

impl PollOptions {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.interval.is_zero() {
            return Err(Error::InvalidInput(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.max_consecutive_errors == 0 {
            return Err(Error::InvalidInput(
                "max_consecutive_errors must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// State shared between the orchestrator and its poll task
pub(crate) struct Shared {
    pub(crate) service: Arc<dyn JobService>,
    pub(crate) state: watch::Sender<JobState>,
    pub(crate) options: PollOptions,
    generation: AtomicU64,
}

/// Identity of one tracking session plus its stop signal
#[derive(Clone)]
pub(crate) struct SessionToken {
    generation: u64,
    stop: watch::Receiver<bool>,
}

impl Shared {
    pub(crate) fn new(service: Arc<dyn JobService>, options: PollOptions) -> Self {
        Self {
            service,
            state: watch::Sender::new(JobState::idle()),
            options,
            generation: AtomicU64::new(0),
        }
    }

    /// Start a new session, invalidating any previous one
    pub(crate) fn begin_session(&self) -> (SessionToken, watch::Sender<bool>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (stop_tx, stop_rx) = watch::channel(false);
        (
            SessionToken {
                generation,
                stop: stop_rx,
            },
            stop_tx,
        )
    }

    /// Invalidate the current session without starting another
    pub(crate) fn end_sessions(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Invalidate `token`'s session if it is still the current one
    pub(crate) fn end_session(&self, token: &SessionToken) -> bool {
        self.generation
            .compare_exchange(
                token.generation,
                token.generation + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    pub(crate) fn is_live(&self, token: &SessionToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.generation && !*token.stop.borrow()
    }

    /// Mutate state only if `token` is still the active session.
    /// Returns whether the write happened.
    pub(crate) fn apply(&self, token: &SessionToken, f: impl FnOnce(&mut JobState)) -> bool {
        self.state.send_if_modified(|state| {
            if !self.is_live(token) {
                return false;
            }
            f(state);
            true
        })
    }
}

/// Owns a running poll task. Dropping it stops the loop.
pub(crate) struct PollHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub(crate) fn spawn(
        shared: Arc<Shared>,
        token: SessionToken,
        stop: watch::Sender<bool>,
        job_id: String,
    ) -> Self {
        let task = tokio::spawn(run(shared, token, job_id));
        Self { stop, task }
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        // Receiver may already be gone if the loop exited on its own
        let _ = self.stop.send(true);
    }
}

enum Tick {
    /// Non-terminal status applied
    Continue,
    /// Terminal state applied
    Done,
    /// Session no longer active; response dropped
    Discarded,
}

async fn run(shared: Arc<Shared>, token: SessionToken, job_id: String) {
    let limit = shared.options.max_consecutive_errors;
    let mut ticker = interval(shared.options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut stop = token.stop.clone();
    let mut consecutive_errors: u32 = 0;

    debug!(job_id = %job_id, interval = ?shared.options.interval, "Poll loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
                continue;
            }
        }

        if !shared.is_live(&token) {
            break;
        }

        match poll_once(&shared, &token, &job_id).await {
            Ok(Tick::Continue) => consecutive_errors = 0,
            Ok(Tick::Done) | Ok(Tick::Discarded) => break,
            Err(source) => {
                if !shared.is_live(&token) {
                    break;
                }
                consecutive_errors += 1;
                if consecutive_errors >= limit {
                    error!(job_id = %job_id, "{} ({})", Error::PollExhausted(consecutive_errors), source);
                    shared.apply(&token, |state| {
                        state.fail(JobFailure::connectivity(consecutive_errors))
                    });
                    break;
                }
                let err = Error::PollTransient {
                    attempt: consecutive_errors,
                    limit,
                    source,
                };
                warn!(job_id = %job_id, "{}", err);
            }
        }
    }

    debug!(job_id = %job_id, "Poll loop stopped");
}

/// One status request, plus the result fetch when the status is terminal.
/// The whole tick counts as one success or one failure.
async fn poll_once(
    shared: &Shared,
    token: &SessionToken,
    job_id: &str,
) -> Result<Tick, ServiceError> {
    let report = shared.service.job_status(job_id).await?;
    debug!(
        job_id = job_id,
        status = %report.status,
        progress = report.progress_percent,
        "Polled job status"
    );

    if report.status.is_terminal() {
        return settle(shared, token, job_id, &report).await;
    }

    if shared.apply(token, |state| state.apply_status(&report)) {
        Ok(Tick::Continue)
    } else {
        Ok(Tick::Discarded)
    }
}

/// Fetch the result of a job whose status is terminal and publish it.
/// Transport failures are returned for retry; a malformed result fails the
/// job immediately.
async fn settle(
    shared: &Shared,
    token: &SessionToken,
    job_id: &str,
    report: &JobStatusReport,
) -> Result<Tick, ServiceError> {
    let applied = match report.status {
        JobStatus::Failed => {
            // A failed job may have no result; fall back to the status message
            let detail = match shared.service.job_result(job_id).await {
                Ok(result) => result.error_message,
                Err(e) => {
                    debug!(job_id = job_id, "No result for failed job: {}", e);
                    None
                }
            };
            let message = detail
                .or_else(|| report.error_message.clone())
                .unwrap_or_else(|| "Validation failed".to_string());
            warn!(job_id = job_id, "{}", Error::ServerReportedFailure(message.clone()));
            shared.apply(token, |state| state.fail(JobFailure::server_reported(message)))
        }
        _ => {
            let fetched = shared.service.job_result(job_id).await.and_then(|result| {
                result.validate_completed()?;
                Ok(result)
            });
            let result = match fetched {
                Ok(result) => result,
                Err(e) if e.is_malformed() => {
                    error!(job_id = job_id, "Unusable result for completed job: {}", e);
                    let applied =
                        shared.apply(token, |state| state.fail(JobFailure::invalid_response(&e)));
                    return Ok(if applied { Tick::Done } else { Tick::Discarded });
                }
                Err(e) => return Err(e),
            };
            info!(
                job_id = job_id,
                overall_score = ?result.overall_score,
                metrics = result.individual_scores.len(),
                "Validation completed"
            );
            shared.apply(token, |state| state.complete(job_id, result))
        }
    };

    Ok(if applied { Tick::Done } else { Tick::Discarded })
}

/// Settle a job that was already terminal when created. Returns whether the
/// state was updated; on error the caller falls back to polling.
pub(crate) async fn settle_created(
    shared: &Shared,
    token: &SessionToken,
    job_id: &str,
    status: JobStatus,
) -> Result<bool, ServiceError> {
    let report = JobStatusReport {
        status,
        progress_percent: 100,
        error_message: None,
    };
    let tick = settle(shared, token, job_id, &report).await?;
    Ok(matches!(tick, Tick::Done))
}
