//! Start command - submit an idea for validation

use super::{orchestrator, watch};
use crate::print_banner;
use crate::style::*;
use anyhow::Result;
use ideacheck::{ClientSettings, ValidationConfig};
use std::path::PathBuf;

pub struct StartArgs {
    pub idea_id: String,
    pub config: ValidationConfig,
    pub detach: bool,
    pub output: Option<PathBuf>,
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub async fn run(settings: &ClientSettings, args: StartArgs) -> Result<()> {
    print_banner();
    print_header("Start Validation");

    print_key_value("Idea", &args.idea_id);
    print_key_value("Service", &settings.api_url);
    print_key_value("Web search", yes_no(args.config.include_web_search));
    print_key_value(
        "Competitive analysis",
        yes_no(args.config.include_competitive_analysis),
    );
    print_key_value(
        "Max competitors",
        &args.config.max_competitors_to_analyze.to_string(),
    );
    print_key_value("Cached results", yes_no(args.config.use_cached_results));
    println!();

    let orchestrator = orchestrator(settings)?;
    let job_id = orchestrator.start(&args.idea_id, args.config).await?;
    print_key_value("Job", &style_cyan(&job_id));

    if args.detach {
        orchestrator.cancel();
        println!();
        print_success("Validation started");
        print_info(&format!("Follow it with: ideacheck watch {}", job_id));
        return Ok(());
    }
    println!();

    watch::follow(&orchestrator, args.output.as_deref()).await
}
