//! Fetch command - one-shot status and result of a job

use super::{print_job, save_job};
use crate::print_banner;
use crate::style::*;
use anyhow::{bail, Result};
use ideacheck::{stage_label, ClientSettings, HttpJobService, JobPhase, JobService, JobStatus};
use std::path::Path;

pub async fn run(settings: &ClientSettings, job_id: &str, output: Option<&Path>) -> Result<()> {
    print_banner();
    print_header("Validation Job");

    let service = HttpJobService::new(settings)?;
    let status = service.job_status(job_id).await?;

    print_key_value("Job", job_id);
    print_key_value_colored(
        "Status",
        status.status.as_str(),
        phase_color(JobPhase::from(status.status)),
    );

    match status.status {
        JobStatus::Pending | JobStatus::InProgress => {
            print_key_value(
                "Progress",
                &format!(
                    "{} {}%",
                    progress_bar(ideacheck::stage::clamp_percent(status.progress_percent), 30),
                    status.progress_percent
                ),
            );
            print_key_value("Stage", stage_label(status.progress_percent));
            println!();
            print_info(&format!("Follow it with: ideacheck watch {}", job_id));
            Ok(())
        }
        JobStatus::Failed => {
            let message = status
                .error_message
                .unwrap_or_else(|| "Validation failed".to_string());
            bail!(ideacheck::Error::ServerReportedFailure(message))
        }
        JobStatus::Completed => {
            let report = service.job_result(job_id).await?;
            report.validate_completed()?;
            let job = report.into_completed(job_id);
            print_job(&job);
            if let Some(path) = output {
                save_job(path, &job)?;
            }
            Ok(())
        }
    }
}
