//! Validation job records

use crate::error::{Error, Result};
use crate::stage::Stage;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Status reported by the validation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::InProgress => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    /// Apply a reported status without moving backward
    pub fn advance(self, reported: JobStatus) -> JobStatus {
        if self.is_terminal() || reported.rank() < self.rank() {
            self
        } else {
            reported
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score for a single metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Nominally 1.0 - 5.0
    pub value: f64,
    #[serde(default)]
    pub justifications: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<IndexMap<String, serde_json::Value>>,
    /// Set when the service could not evaluate this metric
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl Score {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            justifications: Vec::new(),
            recommendations: Vec::new(),
            evidence: None,
            error: false,
        }
    }

    /// A value that can take part in comparisons
    pub fn is_evaluated(&self) -> bool {
        !self.error && self.value.is_finite()
    }
}

/// Metric name -> score, in the order the service listed them
pub type Scores = IndexMap<String, Score>;

/// One validation run of an idea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationJob {
    pub job_id: String,
    pub idea_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub progress_percent: u8,
    /// Only present once completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub individual_scores: Scores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_recommendation: Option<String>,
    /// Only present once failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ValidationJob {
    pub fn stage(&self) -> Stage {
        Stage::from_percent(self.progress_percent as i64)
    }

    /// Evaluated value of `metric`, if any
    pub fn metric(&self, metric: &str) -> Option<f64> {
        self.individual_scores
            .get(metric)
            .filter(|s| s.is_evaluated())
            .map(|s| s.value)
    }

    /// Check this record can be compared, returning its overall score
    pub fn completed_score(&self) -> Result<f64> {
        if self.job_id.trim().is_empty() {
            return Err(Error::InvalidInput(
                "validation result has no job_id".to_string(),
            ));
        }
        if self.status != JobStatus::Completed {
            return Err(Error::InvalidInput(format!(
                "validation {} is {}, expected completed",
                self.job_id, self.status
            )));
        }
        match self.overall_score {
            Some(score) if score.is_finite() => Ok(score),
            Some(score) => Err(Error::InvalidInput(format!(
                "validation {} has a non-finite overall score ({})",
                self.job_id, score
            ))),
            None => Err(Error::InvalidInput(format!(
                "validation {} is completed but has no overall score",
                self.job_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(score: Option<f64>) -> ValidationJob {
        ValidationJob {
            job_id: "job-1".to_string(),
            idea_id: "idea-1".to_string(),
            status: JobStatus::Completed,
            progress_percent: 100,
            overall_score: score,
            individual_scores: Scores::new(),
            overall_recommendation: None,
            error_message: None,
            created_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&JobStatus::InProgress).unwrap();
        assert_eq!(json, r#""in_progress""#);
        let parsed: JobStatus = serde_json::from_str(r#""failed""#).unwrap();
        assert_eq!(parsed, JobStatus::Failed);
    }

    #[test]
    fn test_status_advance_is_monotonic() {
        assert_eq!(JobStatus::Pending.advance(JobStatus::InProgress), JobStatus::InProgress);
        assert_eq!(JobStatus::InProgress.advance(JobStatus::Pending), JobStatus::InProgress);
        assert_eq!(JobStatus::InProgress.advance(JobStatus::Completed), JobStatus::Completed);
        assert_eq!(JobStatus::Completed.advance(JobStatus::Failed), JobStatus::Completed);
        assert_eq!(JobStatus::Pending.advance(JobStatus::Failed), JobStatus::Failed);
    }

    #[test]
    fn test_errored_metric_is_not_evaluated() {
        let mut job = completed(Some(4.0));
        job.individual_scores
            .insert("market_demand".to_string(), Score::new(3.5));
        let mut broken = Score::new(0.0);
        broken.error = true;
        job.individual_scores.insert("scalability".to_string(), broken);

        assert_eq!(job.metric("market_demand"), Some(3.5));
        assert_eq!(job.metric("scalability"), None);
        assert_eq!(job.metric("team_fit"), None);
    }

    #[test]
    fn test_completed_score_checks() {
        assert_eq!(completed(Some(4.2)).completed_score().unwrap(), 4.2);
        assert!(matches!(
            completed(None).completed_score(),
            Err(Error::InvalidInput(_))
        ));
        assert!(completed(Some(f64::NAN)).completed_score().is_err());

        let mut running = completed(Some(4.0));
        running.status = JobStatus::InProgress;
        assert!(running.completed_score().is_err());
    }

    #[test]
    fn test_score_deserialization_with_defaults() {
        let json = r#"{"value": 3.8, "justifications": ["clear pain point"]}"#;
        let score: Score = serde_json::from_str(json).unwrap();
        assert_eq!(score.value, 3.8);
        assert_eq!(score.justifications, vec!["clear pain point"]);
        assert!(score.recommendations.is_empty());
        assert!(score.evidence.is_none());
        assert!(!score.error);
    }
}
