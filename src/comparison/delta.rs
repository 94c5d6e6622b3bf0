//! Version-over-version deltas

use crate::error::Result;
use crate::job::ValidationJob;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Minimum absolute change counted as movement. Compared exactly, without
/// rounding.
pub const CHANGE_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improved,
    Declined,
    Unchanged,
}

pub fn classify(delta: f64) -> Trend {
    if delta > CHANGE_THRESHOLD {
        Trend::Improved
    } else if delta < -CHANGE_THRESHOLD {
        Trend::Declined
    } else {
        Trend::Unchanged
    }
}

/// Score movement between two validations of an idea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionComparison {
    pub earlier: String,
    pub later: String,
    /// `later - earlier` for each metric evaluated in both
    pub deltas: IndexMap<String, f64>,
    pub improved: Vec<String>,
    pub declined: Vec<String>,
    pub unchanged: Vec<String>,
    /// Unclassified; callers decide how to frame the sign
    pub overall_score_delta: f64,
}

impl VersionComparison {
    pub fn delta_for(&self, metric: &str) -> Option<f64> {
        self.deltas.get(metric).copied()
    }

    pub fn trend_for(&self, metric: &str) -> Option<Trend> {
        self.delta_for(metric).map(classify)
    }
}

/// Compare two completed validations.
///
/// Metrics evaluated in only one of them are left out entirely rather than
/// treated as zero.
pub fn diff(earlier: &ValidationJob, later: &ValidationJob) -> Result<VersionComparison> {
    let earlier_overall = earlier.completed_score()?;
    let later_overall = later.completed_score()?;

    let mut deltas = IndexMap::new();
    let mut improved = Vec::new();
    let mut declined = Vec::new();
    let mut unchanged = Vec::new();

    for metric in earlier.individual_scores.keys() {
        let (Some(before), Some(after)) = (earlier.metric(metric), later.metric(metric)) else {
            continue;
        };
        let delta = after - before;
        match classify(delta) {
            Trend::Improved => improved.push(metric.clone()),
            Trend::Declined => declined.push(metric.clone()),
            Trend::Unchanged => unchanged.push(metric.clone()),
        }
        deltas.insert(metric.clone(), delta);
    }

    Ok(VersionComparison {
        earlier: earlier.job_id.clone(),
        later: later.job_id.clone(),
        deltas,
        improved,
        declined,
        unchanged,
        overall_score_delta: later_overall - earlier_overall,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::job::{JobStatus, Score, Scores};

    fn version(job_id: &str, overall: f64, metrics: &[(&str, f64)]) -> ValidationJob {
        let mut scores = Scores::new();
        for (k, v) in metrics {
            scores.insert(k.to_string(), Score::new(*v));
        }
        ValidationJob {
            job_id: job_id.to_string(),
            idea_id: "idea-1".to_string(),
            status: JobStatus::Completed,
            progress_percent: 100,
            overall_score: Some(overall),
            individual_scores: scores,
            overall_recommendation: None,
            error_message: None,
            created_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_small_delta_is_unchanged() {
        let a = version("v1", 3.0, &[("market_demand", 3.0)]);
        let b = version("v2", 3.0, &[("market_demand", 3.05)]);
        let cmp = diff(&a, &b).unwrap();
        assert_eq!(cmp.unchanged, vec!["market_demand"]);
        assert!(cmp.improved.is_empty());
        assert_eq!(cmp.trend_for("market_demand"), Some(Trend::Unchanged));
    }

    #[test]
    fn test_delta_above_band_is_improved() {
        let a = version("v1", 3.0, &[("market_demand", 3.0)]);
        let b = version("v2", 3.0, &[("market_demand", 3.15)]);
        let cmp = diff(&a, &b).unwrap();
        assert_eq!(cmp.improved, vec!["market_demand"]);
        assert!((cmp.delta_for("market_demand").unwrap() - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_decline() {
        let a = version("v1", 4.0, &[("scalability", 4.0)]);
        let b = version("v2", 3.2, &[("scalability", 3.5)]);
        let cmp = diff(&a, &b).unwrap();
        assert_eq!(cmp.declined, vec!["scalability"]);
        assert!((cmp.overall_score_delta - (-0.8)).abs() < 1e-9);
    }

    #[test]
    fn test_classify_band_edges() {
        assert_eq!(classify(0.1), Trend::Unchanged);
        assert_eq!(classify(-0.1), Trend::Unchanged);
        assert_eq!(classify(0.100_000_1), Trend::Improved);
        assert_eq!(classify(-0.100_000_1), Trend::Declined);
        assert_eq!(classify(0.0), Trend::Unchanged);
    }

    #[test]
    fn test_one_sided_metrics_are_excluded() {
        let a = version("v1", 3.0, &[("problem_clarity", 3.0), ("team_fit", 2.0)]);
        let b = version("v2", 3.5, &[("problem_clarity", 4.0), ("business_model", 4.0)]);
        let cmp = diff(&a, &b).unwrap();

        assert_eq!(cmp.deltas.len(), 1);
        assert_eq!(cmp.improved, vec!["problem_clarity"]);
        for metric in ["team_fit", "business_model"] {
            assert!(!cmp.improved.iter().any(|m| m == metric));
            assert!(!cmp.declined.iter().any(|m| m == metric));
            assert!(!cmp.unchanged.iter().any(|m| m == metric));
            assert_eq!(cmp.delta_for(metric), None);
        }
    }

    #[test]
    fn test_sets_partition_compared_metrics() {
        let a = version("v1", 3.0, &[("a", 1.0), ("b", 2.0), ("c", 3.0)]);
        let b = version("v2", 3.0, &[("a", 2.0), ("b", 2.0), ("c", 1.0)]);
        let cmp = diff(&a, &b).unwrap();
        let total = cmp.improved.len() + cmp.declined.len() + cmp.unchanged.len();
        assert_eq!(total, cmp.deltas.len());
        assert_eq!(cmp.improved, vec!["a"]);
        assert_eq!(cmp.unchanged, vec!["b"]);
        assert_eq!(cmp.declined, vec!["c"]);
    }

    #[test]
    fn test_errored_metric_is_excluded() {
        let a = version("v1", 3.0, &[("solution_fit", 3.0)]);
        let mut b = version("v2", 3.0, &[("solution_fit", 1.0)]);
        b.individual_scores.get_mut("solution_fit").unwrap().error = true;
        let cmp = diff(&a, &b).unwrap();
        assert!(cmp.deltas.is_empty());
        assert!(cmp.declined.is_empty());
    }

    #[test]
    fn test_incomplete_input_fails_fast() {
        let a = version("v1", 3.0, &[]);
        let mut b = version("v2", 3.0, &[]);
        b.status = JobStatus::Failed;
        assert!(matches!(diff(&a, &b), Err(Error::InvalidInput(_))));
        assert!(matches!(diff(&b, &a), Err(Error::InvalidInput(_))));
    }
}
