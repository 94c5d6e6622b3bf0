//! Compare command - winners across several ideas

use super::load_job;
use crate::print_banner;
use crate::style::*;
use anyhow::Result;
use ideacheck::{compare_with_recommendation, MetricCatalog, ValidationJob};
use std::path::PathBuf;

pub fn run(files: &[PathBuf], recommendation: Option<String>) -> Result<()> {
    let results = files
        .iter()
        .map(|path| load_job(path))
        .collect::<Result<Vec<ValidationJob>>>()?;
    let report = compare_with_recommendation(&results, recommendation)?;
    let catalog = MetricCatalog::default();

    print_banner();
    print_header("Idea Comparison");

    println!(
        "  {:<28} {:<24} {}",
        style_bold("Metric"),
        style_bold("Leader"),
        style_bold("Score")
    );
    println!("  {}", style_dim(&"─".repeat(60)));

    for (metric, job_id) in &report.metric_winners {
        let Some(winner) = find(&results, job_id) else {
            continue;
        };
        let score = winner
            .metric(metric)
            .map(|s| format!("{:.1}", s))
            .unwrap_or_default();
        println!(
            "  {:<20} {}{:<16}{} {}",
            catalog.display_name(metric),
            colors::GREEN,
            label(winner),
            colors::RESET,
            score
        );
    }

    print_section("Overall");
    if let Some(winner) = find(&results, &report.overall_winner) {
        let text = match winner.overall_score {
            Some(score) => format!("{} ({:.1}/5)", label(winner), score),
            None => label(winner).to_string(),
        };
        print_key_value_colored("Top idea", &text, colors::GREEN);
    }
    print_key_value("Compared", &report.idea_ids.join(", "));

    print_section("Recommendation");
    println!("  {}", report.overall_recommendation);
    println!();
    Ok(())
}

fn find<'a>(results: &'a [ValidationJob], job_id: &str) -> Option<&'a ValidationJob> {
    results.iter().find(|r| r.job_id == job_id)
}

/// Idea id, or the job id for results saved without one
fn label(job: &ValidationJob) -> &str {
    if job.idea_id.is_empty() {
        &job.job_id
    } else {
        &job.idea_id
    }
}
