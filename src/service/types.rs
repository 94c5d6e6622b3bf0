use crate::config::ValidationConfig;
use crate::error::ServiceError;
use crate::job::{JobStatus, Scores, ValidationJob};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub idea_id: String,
    pub config: ValidationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCreated {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub progress_percent: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusReport {
    pub status: JobStatus,
    #[serde(default)]
    pub progress_percent: i64,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResultReport {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub idea_id: Option<String>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub individual_scores: Scores,
    #[serde(default)]
    pub overall_recommendation: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

fn check_progress(progress: i64) -> Result<(), ServiceError> {
    if !(0..=100).contains(&progress) {
        return Err(ServiceError::InvalidResponse(format!(
            "progress_percent {} outside 0-100",
            progress
        )));
    }
    Ok(())
}

impl JobCreated {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.job_id.trim().is_empty() {
            return Err(ServiceError::InvalidResponse(
                "create response has an empty job_id".to_string(),
            ));
        }
        check_progress(self.progress_percent)
    }
}

impl JobStatusReport {
    pub fn validate(&self) -> Result<(), ServiceError> {
        check_progress(self.progress_percent)
    }
}

impl JobResultReport {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if let Some(score) = self.overall_score {
            if !score.is_finite() {
                return Err(ServiceError::InvalidResponse(
                    "overall_score is not a finite number".to_string(),
                ));
            }
        }
        for (metric, score) in &self.individual_scores {
            if !score.error && !score.value.is_finite() {
                return Err(ServiceError::InvalidResponse(format!(
                    "score for {} is not a finite number",
                    metric
                )));
            }
        }
        Ok(())
    }

    /// Completed record for `job_id`. A missing `completed_at` is stamped now.
    pub fn into_completed(self, job_id: &str) -> ValidationJob {
        ValidationJob {
            job_id: job_id.to_string(),
            idea_id: self.idea_id.unwrap_or_default(),
            status: JobStatus::Completed,
            progress_percent: 100,
            overall_score: self.overall_score,
            individual_scores: self.individual_scores,
            overall_recommendation: self.overall_recommendation,
            error_message: None,
            created_at: self.created_at,
            completed_at: Some(self.completed_at.unwrap_or_else(Utc::now)),
        }
    }

    /// Validate a result that must carry scores (completed job)
    pub fn validate_completed(&self) -> Result<(), ServiceError> {
        self.validate()?;
        if self.overall_score.is_none() {
            return Err(ServiceError::InvalidResponse(
                "completed result has no overall_score".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_created_deserialization() {
        let json = r#"{"job_id": "job-9", "status": "pending", "progress_percent": 0}"#;
        let created: JobCreated = serde_json::from_str(json).unwrap();
        assert_eq!(created.job_id, "job-9");
        assert_eq!(created.status, JobStatus::Pending);
        assert!(created.validate().is_ok());
    }

    #[test]
    fn test_job_created_rejects_empty_id() {
        let created = JobCreated {
            job_id: "  ".to_string(),
            status: JobStatus::Pending,
            progress_percent: 0,
        };
        assert!(matches!(
            created.validate(),
            Err(ServiceError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_status_rejects_out_of_range_progress() {
        let report: JobStatusReport =
            serde_json::from_str(r#"{"status": "in_progress", "progress_percent": 140}"#).unwrap();
        assert!(report.validate().is_err());

        let report: JobStatusReport =
            serde_json::from_str(r#"{"status": "in_progress", "progress_percent": 45}"#).unwrap();
        assert!(report.validate().is_ok());
    }

    #[test]
    fn test_status_missing_field_fails_decode() {
        let parsed = serde_json::from_str::<JobStatusReport>(r#"{"progress_percent": 10}"#);
        assert!(parsed.is_err());

        let parsed = serde_json::from_str::<JobStatusReport>(r#"{"status": "exploded"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_result_deserialization() {
        let json = r#"{
            "overall_score": 4.1,
            "individual_scores": {
                "problem_clarity": {"value": 4.5, "justifications": ["well scoped"], "recommendations": []},
                "market_demand": {"value": 3.7, "justifications": [], "recommendations": ["interview buyers"]}
            },
            "overall_recommendation": "Proceed with a pilot"
        }"#;
        let result: JobResultReport = serde_json::from_str(json).unwrap();
        assert_eq!(result.overall_score, Some(4.1));
        let keys: Vec<&str> = result.individual_scores.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["problem_clarity", "market_demand"]);
        assert!(result.validate_completed().is_ok());
    }

    #[test]
    fn test_completed_result_requires_overall_score() {
        let result: JobResultReport =
            serde_json::from_str(r#"{"individual_scores": {}}"#).unwrap();
        assert!(result.validate().is_ok());
        assert!(result.validate_completed().is_err());
    }

    #[test]
    fn test_into_completed() {
        let result: JobResultReport = serde_json::from_str(
            r#"{"idea_id": "idea-3", "overall_score": 3.2, "individual_scores": {"scalability": {"value": 3.0}}}"#,
        )
        .unwrap();
        let job = result.into_completed("job-3");
        assert_eq!(job.job_id, "job-3");
        assert_eq!(job.idea_id, "idea-3");
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress_percent, 100);
        assert!(job.completed_at.is_some());
        assert_eq!(job.completed_score().unwrap(), 3.2);
    }
}
