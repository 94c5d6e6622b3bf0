//! Cross-idea comparison

use super::catalog::MetricCatalog;
use crate::error::{Error, Result};
use crate::job::ValidationJob;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Winners across a set of completed validations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Ideas compared, in input order without repeats
    pub idea_ids: Vec<String>,
    /// Metric key -> job_id of the winning validation. Metrics nobody
    /// evaluated have no entry.
    pub metric_winners: IndexMap<String, String>,
    /// job_id of the validation with the highest overall score
    pub overall_winner: String,
    pub overall_recommendation: String,
}

impl ComparisonReport {
    pub fn winner_for(&self, metric: &str) -> Option<&str> {
        self.metric_winners.get(metric).map(String::as_str)
    }
}

/// Compare completed validations over the default catalog.
///
/// Ties go to the earliest entry in `results`. This is a stable and
/// deterministic rule, but arbitrary: nothing else distinguishes tied
/// scores.
pub fn compare(results: &[ValidationJob]) -> Result<ComparisonReport> {
    compare_with_catalog(results, &MetricCatalog::default(), None)
}

/// Like [`compare`], with a recommendation supplied by the service
pub fn compare_with_recommendation(
    results: &[ValidationJob],
    recommendation: Option<String>,
) -> Result<ComparisonReport> {
    compare_with_catalog(results, &MetricCatalog::default(), recommendation)
}

pub fn compare_with_catalog(
    results: &[ValidationJob],
    catalog: &MetricCatalog,
    recommendation: Option<String>,
) -> Result<ComparisonReport> {
    if results.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "comparison needs at least 2 completed validations, got {}",
            results.len()
        )));
    }

    let mut overall_scores = Vec::with_capacity(results.len());
    let mut seen = HashSet::new();
    for result in results {
        overall_scores.push(result.completed_score()?);
        if !seen.insert(result.job_id.as_str()) {
            return Err(Error::InvalidInput(format!(
                "validation {} appears more than once",
                result.job_id
            )));
        }
    }

    let mut metric_winners = IndexMap::new();
    for key in catalog.keys() {
        let best = best_index(results.iter().map(|r| r.metric(key)));
        if let Some(idx) = best {
            metric_winners.insert(key.to_string(), results[idx].job_id.clone());
        }
    }

    // All overall scores are present, so there is always a winner
    let winner_idx = best_index(overall_scores.iter().map(|s| Some(*s))).unwrap_or(0);
    let winner = &results[winner_idx];

    let overall_recommendation = recommendation
        .filter(|r| !r.trim().is_empty())
        .or_else(|| {
            winner
                .overall_recommendation
                .clone()
                .filter(|r| !r.trim().is_empty())
        })
        .unwrap_or_else(|| fallback_recommendation(winner, overall_scores[winner_idx], results.len()));

    let mut idea_ids: Vec<String> = Vec::new();
    for result in results {
        if !idea_ids.contains(&result.idea_id) {
            idea_ids.push(result.idea_id.clone());
        }
    }

    Ok(ComparisonReport {
        idea_ids,
        metric_winners,
        overall_winner: winner.job_id.clone(),
        overall_recommendation,
    })
}

/// Index of the strictly highest value; the first one wins ties
fn best_index(values: impl Iterator<Item = Option<f64>>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, value) in values.enumerate() {
        let Some(value) = value else { continue };
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

fn fallback_recommendation(winner: &ValidationJob, score: f64, count: usize) -> String {
    let name = if winner.idea_id.is_empty() {
        &winner.job_id
    } else {
        &winner.idea_id
    };
    format!(
        "{} has the strongest overall score ({:.1}/5) of the {} ideas compared.",
        name, score, count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobStatus, Score, Scores};

    fn result(job_id: &str, idea_id: &str, overall: f64, metrics: &[(&str, f64)]) -> ValidationJob {
        let mut scores = Scores::new();
        for (k, v) in metrics {
            scores.insert(k.to_string(), Score::new(*v));
        }
        ValidationJob {
            job_id: job_id.to_string(),
            idea_id: idea_id.to_string(),
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
    fn test_overall_tie_goes_to_first_submitted() {
        let results = vec![
            result("r1", "idea-a", 4.2, &[]),
            result("r2", "idea-b", 4.2, &[]),
            result("r3", "idea-c", 3.9, &[]),
        ];
        let report = compare(&results).unwrap();
        assert_eq!(report.overall_winner, "r1");
        assert_eq!(report.idea_ids, vec!["idea-a", "idea-b", "idea-c"]);
    }

    #[test]
    fn test_metric_winners_strictly_highest() {
        let results = vec![
            result("r1", "a", 3.0, &[("market_demand", 3.5), ("solution_fit", 4.0)]),
            result("r2", "b", 4.0, &[("market_demand", 4.5), ("solution_fit", 4.0)]),
        ];
        let report = compare(&results).unwrap();
        assert_eq!(report.winner_for("market_demand"), Some("r2"));
        assert_eq!(report.winner_for("solution_fit"), Some("r1"));
        assert_eq!(report.winner_for("scalability"), None);
        assert_eq!(report.overall_winner, "r2");
    }

    #[test]
    fn test_metric_missing_in_first_result() {
        let results = vec![
            result("r1", "a", 3.0, &[]),
            result("r2", "b", 2.0, &[("scalability", 1.5)]),
        ];
        let report = compare(&results).unwrap();
        assert_eq!(report.winner_for("scalability"), Some("r2"));
    }

    #[test]
    fn test_errored_metric_cannot_win() {
        let mut r1 = result("r1", "a", 3.0, &[("business_model", 4.9)]);
        r1.individual_scores.get_mut("business_model").unwrap().error = true;
        let r2 = result("r2", "b", 3.0, &[("business_model", 2.0)]);
        let report = compare(&[r1, r2]).unwrap();
        assert_eq!(report.winner_for("business_model"), Some("r2"));
    }

    #[test]
    fn test_metrics_outside_catalog_ignored() {
        let results = vec![
            result("r1", "a", 3.0, &[("vibes", 5.0)]),
            result("r2", "b", 3.0, &[("vibes", 1.0)]),
        ];
        let report = compare(&results).unwrap();
        assert!(report.metric_winners.is_empty());

        let catalog = MetricCatalog::new([("vibes", "Vibes")]);
        let report = compare_with_catalog(&results, &catalog, None).unwrap();
        assert_eq!(report.winner_for("vibes"), Some("r1"));
    }

    #[test]
    fn test_rejects_incomplete_input() {
        let mut pending = result("r2", "b", 4.0, &[]);
        pending.status = JobStatus::InProgress;
        pending.overall_score = None;
        let err = compare(&[result("r1", "a", 3.0, &[]), pending]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_too_few_and_duplicates() {
        assert!(compare(&[]).is_err());
        assert!(compare(&[result("r1", "a", 3.0, &[])]).is_err());
        let dup = result("r1", "a", 3.0, &[]);
        assert!(matches!(
            compare(&[dup.clone(), dup]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_recommendation_passthrough_and_fallback() {
        let results = vec![result("r1", "idea-a", 4.4, &[]), result("r2", "idea-b", 3.1, &[])];

        let report =
            compare_with_recommendation(&results, Some("Pursue idea A first.".to_string()))
                .unwrap();
        assert_eq!(report.overall_recommendation, "Pursue idea A first.");

        let report = compare(&results).unwrap();
        assert_eq!(
            report.overall_recommendation,
            "idea-a has the strongest overall score (4.4/5) of the 2 ideas compared."
        );

        let mut with_own = results.clone();
        with_own[0].overall_recommendation = Some("Run a landing page test.".to_string());
        let report = compare(&with_own).unwrap();
        assert_eq!(report.overall_recommendation, "Run a landing page test.");
    }
}
