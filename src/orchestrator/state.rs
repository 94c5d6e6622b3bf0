//! Observable job state
//!
//! A snapshot of the tracked job, published through a watch channel. Every
//! transition goes through the methods here so the phase, progress and
//! timestamps stay consistent.

use crate::error::JobFailure;
use crate::job::{JobStatus, ValidationJob};
use crate::service::{JobCreated, JobResultReport, JobStatusReport};
use crate::stage::{self, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle phase as seen by consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// Nothing tracked
    Idle,
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl JobPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobPhase::Completed | JobPhase::Failed)
    }

    pub fn is_active(self) -> bool {
        matches!(self, JobPhase::Pending | JobPhase::InProgress)
    }

    fn status(self) -> Option<JobStatus> {
        match self {
            JobPhase::Idle => None,
            JobPhase::Pending => Some(JobStatus::Pending),
            JobPhase::InProgress => Some(JobStatus::InProgress),
            JobPhase::Completed => Some(JobStatus::Completed),
            JobPhase::Failed => Some(JobStatus::Failed),
        }
    }
}

impl From<JobStatus> for JobPhase {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => JobPhase::Pending,
            JobStatus::InProgress => JobPhase::InProgress,
            JobStatus::Completed => JobPhase::Completed,
            JobStatus::Failed => JobPhase::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobState {
    pub phase: JobPhase,
    pub job_id: Option<String>,
    pub idea_id: Option<String>,
    pub progress_percent: u8,
    /// Present once completed
    pub result: Option<ValidationJob>,
    /// Present once failed
    pub failure: Option<JobFailure>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Default for JobState {
    fn default() -> Self {
        Self::idle()
    }
}

impl JobState {
    pub fn idle() -> Self {
        Self {
            phase: JobPhase::Idle,
            job_id: None,
            idea_id: None,
            progress_percent: 0,
            result: None,
            failure: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Fresh state for a job that is being created
    pub(crate) fn starting(idea_id: &str) -> Self {
        Self {
            phase: JobPhase::Pending,
            idea_id: Some(idea_id.to_string()),
            started_at: Some(Utc::now()),
            ..Self::idle()
        }
    }

    /// Fresh state for reattaching to a job created elsewhere
    pub(crate) fn attached(job_id: &str) -> Self {
        Self {
            phase: JobPhase::Pending,
            job_id: Some(job_id.to_string()),
            ..Self::idle()
        }
    }

    pub fn stage(&self) -> Stage {
        Stage::from_percent(self.progress_percent as i64)
    }

    pub fn stage_label(&self) -> &'static str {
        self.stage().label()
    }

    pub fn status(&self) -> Option<JobStatus> {
        self.phase.status()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub(crate) fn accept_created(&mut self, created: &JobCreated) {
        self.job_id = Some(created.job_id.clone());
        if !created.status.is_terminal() {
            self.apply_progress(created.status, created.progress_percent);
        }
    }

    /// Apply a non-terminal poll report. Progress and status never regress.
    pub(crate) fn apply_status(&mut self, report: &JobStatusReport) {
        if report.status.is_terminal() {
            return;
        }
        self.apply_progress(report.status, report.progress_percent);
    }

    fn apply_progress(&mut self, status: JobStatus, progress: i64) {
        if let Some(current) = self.status() {
            if !current.is_terminal() {
                self.phase = current.advance(status).into();
            }
        }
        self.progress_percent = stage::smooth_progress(self.progress_percent, progress);
    }

    pub(crate) fn complete(&mut self, job_id: &str, report: JobResultReport) {
        let mut job = report.into_completed(job_id);
        match &self.idea_id {
            Some(idea_id) => job.idea_id = idea_id.clone(),
            None if !job.idea_id.is_empty() => self.idea_id = Some(job.idea_id.clone()),
            None => {}
        }
        job.created_at = job.created_at.or(self.started_at);
        let completed_at = job.completed_at.unwrap_or_else(Utc::now);

        self.result = Some(job);
        self.phase = JobPhase::Completed;
        self.progress_percent = 100;
        self.failure = None;
        self.completed_at.get_or_insert(completed_at);
    }

    pub(crate) fn fail(&mut self, failure: JobFailure) {
        self.phase = JobPhase::Failed;
        self.failure = Some(failure);
        self.result = None;
        self.completed_at.get_or_insert_with(Utc::now);
    }
}
