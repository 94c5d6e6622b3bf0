//! Error types for ideacheck

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Library Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the network boundary with the validation service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    /// The service answered, but with a payload that cannot be used.
    /// Asking again will not help.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ServiceError::Json(_) | ServiceError::InvalidResponse(_))
    }
}

/// Job lifecycle and comparison errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to start validation job: {0}")]
    StartFailed(#[source] ServiceError),

    #[error("Status poll failed ({attempt}/{limit}): {source}")]
    PollTransient {
        attempt: u32,
        limit: u32,
        #[source]
        source: ServiceError,
    },

    #[error("Lost contact with the validation service after {0} consecutive failures")]
    PollExhausted(u32),

    #[error("Validation failed: {0}")]
    ServerReportedFailure(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Why a tracked job ended up in the failed phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The create request was rejected or unreachable
    StartFailed,
    /// Too many consecutive poll failures; the job may still be running remotely
    PollExhausted { attempts: u32 },
    /// The service itself reported the job as failed
    ServerReported,
    /// The service returned a result that fails its shape checks
    InvalidResponse,
}

/// Failure record carried in the observable job state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl JobFailure {
    /// Message shown when polling gives up. Client side only.
    pub const CONNECTIVITY_MESSAGE: &'static str =
        "Lost connection to the validation service. Refresh to check the job again.";

    pub fn connectivity(attempts: u32) -> Self {
        Self {
            kind: FailureKind::PollExhausted { attempts },
            message: Self::CONNECTIVITY_MESSAGE.to_string(),
        }
    }

    pub fn server_reported(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::ServerReported,
            message: message.into(),
        }
    }

    pub fn invalid_response(err: &ServiceError) -> Self {
        Self {
            kind: FailureKind::InvalidResponse,
            message: err.to_string(),
        }
    }

    pub fn start_failed(err: &ServiceError) -> Self {
        Self {
            kind: FailureKind::StartFailed,
            message: err.to_string(),
        }
    }

    /// Matching error from the taxonomy. Start failures were already returned
    /// by `start`, so they map to `None`.
    pub fn to_error(&self) -> Option<Error> {
        match self.kind {
            FailureKind::StartFailed => None,
            FailureKind::PollExhausted { attempts } => Some(Error::PollExhausted(attempts)),
            FailureKind::ServerReported => {
                Some(Error::ServerReportedFailure(self.message.clone()))
            }
            FailureKind::InvalidResponse => Some(Error::InvalidInput(self.message.clone())),
        }
    }
}
