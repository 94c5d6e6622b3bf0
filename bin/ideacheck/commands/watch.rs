//! Watch command - follow a running validation job

use super::{orchestrator, print_job, save_job};
use crate::print_banner;
use crate::style::*;
use anyhow::{anyhow, bail, Result};
use ideacheck::{ClientSettings, FailureKind, JobOrchestrator, JobPhase, JobState};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

const SPINNER_INTERVAL: Duration = Duration::from_millis(120);

pub async fn run(settings: &ClientSettings, job_id: &str, output: Option<&Path>) -> Result<()> {
    print_banner();
    print_header("Watch Validation");

    let orchestrator = orchestrator(settings)?;
    orchestrator.resume(job_id)?;
    print_key_value("Job", job_id);
    print_key_value("Service", &settings.api_url);
    println!();

    follow(&orchestrator, output).await
}

/// Render the tracked job until it finishes or the user presses Ctrl+C
pub async fn follow(orchestrator: &JobOrchestrator, output: Option<&Path>) -> Result<()> {
    println!("  {}", style_dim("Ctrl+C to stop watching"));
    println!();

    let mut rx = orchestrator.subscribe();
    let mut spinner = tokio::time::interval(SPINNER_INTERVAL);
    let mut tick = 0u64;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let state = loop {
        let state = rx.borrow_and_update().clone();
        render_progress(&state, tick)?;
        if state.is_terminal() {
            break state;
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    bail!("Job state is no longer available");
                }
            }
            _ = spinner.tick() => tick += 1,
            _ = &mut ctrl_c => {
                orchestrator.cancel();
                println!();
                println!();
                print_warning("Stopped watching. The job keeps running on the service.");
                if let Some(job_id) = &state.job_id {
                    print_info(&format!("Reattach with: ideacheck watch {}", job_id));
                }
                return Ok(());
            }
        }
    };
    println!();

    finish(state, output)
}

fn render_progress(state: &JobState, tick: u64) -> std::io::Result<()> {
    let frame = if state.is_terminal() {
        " "
    } else {
        spinner_frame(tick)
    };
    print!(
        "\r  {} {} {:>3}%  {}{:<28}{}",
        frame,
        progress_bar(state.progress_percent, 30),
        state.progress_percent,
        phase_color(state.phase),
        state.stage_label(),
        colors::RESET
    );
    std::io::stdout().flush()
}

fn finish(state: JobState, output: Option<&Path>) -> Result<()> {
    match (state.phase, state.result) {
        (JobPhase::Completed, Some(job)) => {
            println!();
            print_success("Validation complete");
            print_job(&job);
            if let Some(path) = output {
                save_job(path, &job)?;
            }
            Ok(())
        }
        _ => {
            let failure = state
                .failure
                .ok_or_else(|| anyhow!("Job ended without a result"))?;
            if let FailureKind::PollExhausted { .. } = failure.kind {
                println!();
                print_warning(&failure.message);
                if let Some(job_id) = &state.job_id {
                    print_info(&format!("Check again with: ideacheck watch {}", job_id));
                }
            }
            match failure.to_error() {
                Some(err) => Err(err.into()),
                None => Err(anyhow!(failure.message)),
            }
        }
    }
}
