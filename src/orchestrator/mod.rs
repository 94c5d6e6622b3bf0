//! Job Lifecycle Orchestrator
//!
//! Tracks at most one validation job per instance:
//!
//! ```text
//! idle ──start──► pending ──poll──► in_progress ──poll──► completed | failed
//!   ▲                                                          │
//!   └──────────────────────── cancel / start ◄─────────────────┘
//! ```
//!
//! The orchestrator is the only owner of the poll timer. The loop lives in a
//! spawned task held by a `PollHandle`; replacing,
//! cancelling or dropping the orchestrator drops that handle, which stops the
//! loop. Each tracking session has a generation number, and a response that
//! arrives for a stale generation is discarded instead of applied.
//!
//! Consumers observe progress through [`JobOrchestrator::subscribe`].

mod poller;
pub mod state;

pub use poller::PollOptions;
pub use state::{JobPhase, JobState};

use crate::config::{ClientSettings, ValidationConfig};
use crate::error::{Error, JobFailure, Result};
use crate::service::JobService;
use parking_lot::Mutex;
use poller::{PollHandle, SessionToken, Shared};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct JobOrchestrator {
    shared: Arc<Shared>,
    poller: Mutex<Option<PollHandle>>,
}

impl JobOrchestrator {
    pub fn new(service: Arc<dyn JobService>, options: PollOptions) -> Self {
        Self {
            shared: Arc::new(Shared::new(service, options)),
            poller: Mutex::new(None),
        }
    }

    /// Orchestrator using the poll settings from `settings`
    pub fn from_settings(service: Arc<dyn JobService>, settings: &ClientSettings) -> Self {
        Self::new(
            service,
            PollOptions {
                interval: settings.poll_interval(),
                max_consecutive_errors: settings.max_consecutive_errors,
            },
        )
    }

    /// Current snapshot
    pub fn state(&self) -> JobState {
        self.shared.state.borrow().clone()
    }

    /// Receiver that is notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.shared.state.subscribe()
    }

    pub fn options(&self) -> PollOptions {
        self.shared.options
    }

    /// Whether a poll loop is currently running
    pub fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .as_ref()
            .map(PollHandle::is_running)
            .unwrap_or(false)
    }

    /// Create a remote job for `idea_id` and start tracking it.
    ///
    /// Any previously tracked job stops being polled. The create request is
    /// not retried; its failure is returned as [`Error::StartFailed`] and also
    /// published as a failed state.
    pub async fn start(&self, idea_id: &str, config: ValidationConfig) -> Result<String> {
        if idea_id.trim().is_empty() {
            return Err(Error::InvalidInput("idea_id must not be empty".to_string()));
        }
        config.validate()?;
        self.shared.options.validate()?;

        self.stop_poller();
        let (token, stop) = self.shared.begin_session();
        self.shared.state.send_replace(JobState::starting(idea_id));
        let guard = StartGuard::new(&self.shared, &token);
        info!(
            idea_id = idea_id,
            web_search = config.include_web_search,
            competitive_analysis = config.include_competitive_analysis,
            max_competitors = config.max_competitors_to_analyze,
            cached = config.use_cached_results,
            "Starting validation job"
        );

        let created = match self.shared.service.create_job(idea_id, &config).await {
            Ok(created) => created,
            Err(e) => {
                warn!(idea_id = idea_id, "Validation job could not be created: {}", e);
                self.shared
                    .apply(&token, |state| state.fail(JobFailure::start_failed(&e)));
                guard.disarm();
                return Err(Error::StartFailed(e));
            }
        };
        let job_id = created.job_id.clone();

        if !self
            .shared
            .apply(&token, |state| state.accept_created(&created))
        {
            debug!(job_id = %job_id, "Start superseded before the job was tracked");
            guard.disarm();
            return Ok(job_id);
        }
        info!(job_id = %job_id, status = %created.status, "Validation job created");

        if created.status.is_terminal() {
            match poller::settle_created(&self.shared, &token, &job_id, created.status).await {
                Ok(_) => {
                    guard.disarm();
                    return Ok(job_id);
                }
                Err(e) => warn!(
                    job_id = %job_id,
                    "Result fetch for finished job failed, polling instead: {}", e
                ),
            }
        }

        guard.disarm();
        self.install(PollHandle::spawn(
            Arc::clone(&self.shared),
            token,
            stop,
            job_id.clone(),
        ));
        Ok(job_id)
    }

    /// Reattach to a job that was started earlier, e.g. by another process.
    /// Must be called from within a Tokio runtime.
    pub fn resume(&self, job_id: &str) -> Result<()> {
        if job_id.trim().is_empty() {
            return Err(Error::InvalidInput("job_id must not be empty".to_string()));
        }
        self.shared.options.validate()?;

        self.stop_poller();
        let (token, stop) = self.shared.begin_session();
        self.shared.state.send_replace(JobState::attached(job_id));
        info!(job_id = job_id, "Resuming validation job");

        self.install(PollHandle::spawn(
            Arc::clone(&self.shared),
            token,
            stop,
            job_id.to_string(),
        ));
        Ok(())
    }

    /// Stop tracking locally. The remote job is not contacted and may keep
    /// running. Safe to call in any phase.
    pub fn cancel(&self) {
        self.stop_poller();
        let cleared = self.shared.state.send_if_modified(|state| {
            if state.phase == JobPhase::Idle {
                return false;
            }
            *state = JobState::idle();
            true
        });
        if cleared {
            info!("Validation tracking cancelled");
        }
    }

    fn install(&self, handle: PollHandle) {
        let previous = self.poller.lock().replace(handle);
        drop(previous);
    }

    /// Invalidate the active session and release the poll task
    fn stop_poller(&self) {
        self.shared.end_sessions();
        let handle = self.poller.lock().take();
        drop(handle);
    }
}

/// Resets a half-started session when `start` is dropped before the job is
/// either tracked or settled.
struct StartGuard<'a> {
    shared: &'a Shared,
    token: &'a SessionToken,
    armed: bool,
}

impl<'a> StartGuard<'a> {
    fn new(shared: &'a Shared, token: &'a SessionToken) -> Self {
        Self {
            shared,
            token,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if self.shared.apply(self.token, |state| *state = JobState::idle()) {
            debug!("Abandoned start reset to idle");
        }
        self.shared.end_session(self.token);
    }
}

impl Drop for JobOrchestrator {
    fn drop(&mut self) {
        self.stop_poller();
    }
}
