//! Ping command - check the validation service is reachable

use crate::style::*;
use anyhow::{Context, Result};
use ideacheck::{ClientSettings, HttpJobService};
use std::time::Instant;

pub async fn run(settings: &ClientSettings) -> Result<()> {
    let service = HttpJobService::new(settings)?;
    let started = Instant::now();
    let health = service
        .health()
        .await
        .with_context(|| format!("{} is not reachable", service.base_url()))?;

    print_success(&format!(
        "{} is {} ({} ms)",
        service.base_url(),
        health.status,
        started.elapsed().as_millis()
    ));
    Ok(())
}
