//! CLI command handlers

pub mod compare;
pub mod diff;
pub mod fetch;
pub mod ping;
pub mod start;
pub mod watch;

use crate::style::*;
use anyhow::{Context, Result};
use ideacheck::{ClientSettings, HttpJobService, JobOrchestrator, MetricCatalog, ValidationJob};
use std::path::Path;
use std::sync::Arc;

pub fn orchestrator(settings: &ClientSettings) -> Result<JobOrchestrator> {
    let service = HttpJobService::new(settings)?;
    Ok(JobOrchestrator::from_settings(Arc::new(service), settings))
}

/// Read a result file written with `--output`
pub fn load_job(path: &Path) -> Result<ValidationJob> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn save_job(path: &Path, job: &ValidationJob) -> Result<()> {
    let contents = serde_json::to_string_pretty(job).context("Failed to serialize result")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    print_success(&format!("Result saved to {}", path.display()));
    Ok(())
}

pub fn print_job(job: &ValidationJob) {
    let catalog = MetricCatalog::default();

    print_section("Result");
    print_key_value("Job", &job.job_id);
    if !job.idea_id.is_empty() {
        print_key_value("Idea", &job.idea_id);
    }
    if let Some(score) = job.overall_score {
        print_key_value_colored("Overall", &format!("{:.1}/5", score), score_color(score));
    }

    if !job.individual_scores.is_empty() {
        print_section("Metrics");
        for (key, score) in &job.individual_scores {
            let name = catalog.display_name(key);
            if score.is_evaluated() {
                print_key_value_colored(name, &format!("{:.1}", score.value), score_color(score.value));
            } else {
                print_key_value(name, &style_dim("not evaluated"));
            }
        }
    }

    if let Some(recommendation) = &job.overall_recommendation {
        print_section("Recommendation");
        println!("  {}", recommendation);
    }
    println!();
}
