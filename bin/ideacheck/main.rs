//! Ideacheck CLI
//!
//! Starts idea validations on the validation service, follows their
//! progress, and compares saved results.

mod commands;
mod style;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ideacheck::{ClientSettings, ConfigFile, ValidationConfig};
use std::path::{Path, PathBuf};
use style::colors::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ideacheck")]
#[command(about = "Validate startup ideas and compare the results")]
#[command(version)]
struct Cli {
    /// Validation service URL
    #[arg(long, global = true, env = "IDEACHECK_API_URL")]
    api_url: Option<String>,

    /// Token sent as a bearer credential
    #[arg(long, global = true, env = "IDEACHECK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Config file (default: <config dir>/ideacheck/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start validating an idea and follow its progress
    Start {
        /// Idea to validate
        idea_id: String,

        /// Skip web search for market signals
        #[arg(long)]
        no_web_search: bool,

        /// Skip competitor discovery
        #[arg(long)]
        no_competitive_analysis: bool,

        /// Upper bound on competitors analyzed (1-20)
        #[arg(long)]
        max_competitors: Option<u32>,

        /// Force a fresh analysis even if a cached result exists
        #[arg(long)]
        no_cache: bool,

        /// Print the job id and exit without waiting
        #[arg(long)]
        detach: bool,

        /// Write the completed result as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Reattach to a running job and follow its progress
    Watch {
        job_id: String,

        /// Write the completed result as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch the current status or result of a job once
    Fetch {
        job_id: String,

        /// Write the completed result as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Pick winners across saved results of different ideas
    Compare {
        /// Result files written with --output
        #[arg(required = true, num_args = 2..)]
        files: Vec<PathBuf>,

        /// Recommendation text to show instead of the generated one
        #[arg(long)]
        recommendation: Option<String>,
    },
    /// Show score movement between two saved results of one idea
    Diff { earlier: PathBuf, later: PathBuf },
    /// Check the validation service is reachable
    Ping,
}

pub fn print_banner() {
    println!();
    println!(
        "  {}{}ideacheck{} {}v{}{}",
        BOLD,
        CYAN,
        RESET,
        DIM,
        env!("CARGO_PKG_VERSION"),
        RESET
    );
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "ideacheck=debug"
    } else {
        "ideacheck=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Client settings and job defaults: flags over environment over file over defaults
fn load_settings(
    config: Option<&Path>,
    api_url: Option<String>,
    api_key: Option<String>,
) -> Result<(ClientSettings, ValidationConfig)> {
    let file = ConfigFile::resolve(config)?;
    let mut settings = file.client.with_env();
    if let Some(url) = api_url {
        settings.api_url = url;
    }
    if let Some(key) = api_key {
        settings.api_key = Some(key);
    }
    settings.validate()?;
    Ok((settings, file.validation))
}

async fn run(cli: Cli) -> Result<()> {
    let Cli {
        api_url,
        api_key,
        config,
        command,
        ..
    } = cli;

    // Offline commands never touch the config file or the network
    let resolve = move || load_settings(config.as_deref(), api_url, api_key);

    match command {
        Commands::Start {
            idea_id,
            no_web_search,
            no_competitive_analysis,
            max_competitors,
            no_cache,
            detach,
            output,
        } => {
            let (settings, mut job_config) = resolve()?;
            job_config.include_web_search &= !no_web_search;
            job_config.include_competitive_analysis &= !no_competitive_analysis;
            job_config.use_cached_results &= !no_cache;
            if let Some(max) = max_competitors {
                job_config.max_competitors_to_analyze = max;
            }
            commands::start::run(
                &settings,
                commands::start::StartArgs {
                    idea_id,
                    config: job_config,
                    detach,
                    output,
                },
            )
            .await
        }
        Commands::Watch { job_id, output } => {
            let (settings, _) = resolve()?;
            commands::watch::run(&settings, &job_id, output.as_deref()).await
        }
        Commands::Fetch { job_id, output } => {
            let (settings, _) = resolve()?;
            commands::fetch::run(&settings, &job_id, output.as_deref()).await
        }
        Commands::Ping => {
            let (settings, _) = resolve()?;
            commands::ping::run(&settings).await
        }
        Commands::Compare {
            files,
            recommendation,
        } => commands::compare::run(&files, recommendation),
        Commands::Diff { earlier, later } => commands::diff::run(&earlier, &later),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        println!();
        style::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
