//! Validation service integration
//!
//! The service runs the actual analysis. The orchestrator talks to it only
//! through [`JobService`], so the transport can be swapped (HTTP in
//! production, scripted doubles in tests).

pub mod client;
pub mod types;

pub use client::HttpJobService;
pub use types::{CreateJobRequest, HealthResponse, JobCreated, JobResultReport, JobStatusReport};

use crate::config::ValidationConfig;
use crate::error::ServiceError;
use async_trait::async_trait;

/// Job-oriented API of the remote validation service
#[async_trait]
pub trait JobService: Send + Sync {
    /// Create a job for `idea_id`
    async fn create_job(
        &self,
        idea_id: &str,
        config: &ValidationConfig,
    ) -> Result<JobCreated, ServiceError>;

    /// Current status and progress of a job
    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, ServiceError>;

    /// Full result of a job that reached a terminal status
    async fn job_result(&self, job_id: &str) -> Result<JobResultReport, ServiceError>;
}
