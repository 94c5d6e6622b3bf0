//! Diff command - score movement between two versions of an idea

use super::load_job;
use crate::print_banner;
use crate::style::*;
use anyhow::Result;
use ideacheck::{classify, diff, MetricCatalog, Trend};
use std::path::Path;

pub fn run(earlier: &Path, later: &Path) -> Result<()> {
    let before = load_job(earlier)?;
    let after = load_job(later)?;
    let cmp = diff(&before, &after)?;
    let catalog = MetricCatalog::default();

    print_banner();
    print_header("Version Comparison");
    print_key_value("Earlier", &cmp.earlier);
    print_key_value("Later", &cmp.later);

    print_section("Metrics");
    for (metric, delta) in &cmp.deltas {
        let from = before.metric(metric).unwrap_or_default();
        let to = after.metric(metric).unwrap_or_default();
        println!(
            "  {} {:<24} {:.1} → {:.1}  {}",
            trend_icon(classify(*delta)),
            catalog.display_name(metric),
            from,
            to,
            style_dim(&format!("({:+.2})", delta))
        );
    }
    if cmp.deltas.is_empty() {
        println!("  {}", style_dim("No metric was evaluated in both versions"));
    }

    print_section("Overall");
    println!(
        "  {} {:+.2}",
        trend_icon(classify(cmp.overall_score_delta)),
        cmp.overall_score_delta
    );
    print_key_value("Improved", &count(cmp.improved.len(), Trend::Improved));
    print_key_value("Declined", &count(cmp.declined.len(), Trend::Declined));
    print_key_value("Unchanged", &count(cmp.unchanged.len(), Trend::Unchanged));
    println!();
    Ok(())
}

fn count(n: usize, trend: Trend) -> String {
    format!("{} {}", trend_icon(trend), n)
}
