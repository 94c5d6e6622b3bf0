//! Idea validation client
//!
//! Starts remote validation jobs for startup ideas, follows them to
//! completion, and compares the scored results.
//!
//! ## Module Structure
//!
//! - `config/`: Job options and client settings
//! - `error/`: Error taxonomy
//! - `job/`: Validation records and scores
//! - `stage/`: Progress percentage to human-readable stage
//! - `service/`: Remote job service trait and HTTP client
//! - `orchestrator/`: Job lifecycle and status polling
//! - `comparison/`: Cross-idea winners and version deltas

pub mod comparison;
pub mod config;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod service;
pub mod stage;

pub use comparison::{
    classify, compare, compare_with_catalog, compare_with_recommendation, diff, ComparisonReport,
    MetricCatalog, Trend, VersionComparison,
};
pub use config::{ClientSettings, ConfigFile, ValidationConfig};
pub use error::{Error, FailureKind, JobFailure, Result, ServiceError};
pub use job::{JobStatus, Score, Scores, ValidationJob};
pub use orchestrator::{JobOrchestrator, JobPhase, JobState, PollOptions};
pub use service::{HttpJobService, JobService};
pub use stage::{stage_label, Stage};
