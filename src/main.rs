//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `fetchpool` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Ctrl-C wiring into the cancellation token
//! - Exit-code handling
//!
//! All core functionality is implemented in the library crate.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use fetchpool::logging::{init_logger_with, LogFormat, LogLevel};
use fetchpool::{
    file_urls, Config, Engine, HostBodySaver, MaxHops, RedirectPolicy, RunError,
    SameRegistrableDomain, StderrErrorLogger,
};

/// Command-line options.
#[derive(Debug, Parser)]
#[command(
    name = "fetchpool",
    about = "Fetches a list of URLs with bounded concurrency and browser impersonation."
)]
struct Opt {
    /// File with one URL per line (blank lines and # comments are skipped)
    #[arg(value_parser)]
    file: PathBuf,

    /// Number of parallel workers
    #[arg(long, default_value_t = fetchpool::DEFAULT_WORKER_COUNT)]
    workers: usize,

    /// Explicit User-Agent (skips the one-shot identity lookup)
    #[arg(long)]
    user_agent: Option<String>,

    /// Maximum redirect hops to follow
    #[arg(long, default_value_t = fetchpool::DEFAULT_MAX_REDIRECTS)]
    max_redirects: usize,

    /// Only follow redirects within the original registrable domain
    #[arg(long)]
    same_domain_redirects: bool,

    /// Save response bodies under this directory, one file per hostname
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let redirect_policy: Arc<dyn RedirectPolicy> = if opt.same_domain_redirects {
        Arc::new(SameRegistrableDomain)
    } else {
        Arc::new(MaxHops::new(opt.max_redirects))
    };

    let mut config = Config {
        worker_count: opt.workers,
        user_agent: opt.user_agent.clone(),
        redirect_policy: Some(redirect_policy),
        error_handler: Some(Arc::new(StderrErrorLogger)),
        ..Config::default()
    };
    if let Some(dir) = &opt.output_dir {
        config.response_handler = Some(Arc::new(HostBodySaver::new(dir.clone())));
    }

    let engine = Engine::new(config)
        .await
        .context("Failed to initialize fetch engine")?;
    log::debug!("Using User-Agent: {}", engine.user_agent());

    let urls = file_urls(&opt.file)
        .await
        .with_context(|| format!("Failed to open URL file {}", opt.file.display()))?;

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Ctrl-C received, finishing in-flight URLs");
            ctrl_c_cancel.cancel();
        }
    });

    match engine.run(urls, cancel).await {
        Ok(()) => Ok(()),
        Err(RunError::Cancelled) => {
            eprintln!("fetchpool: cancelled");
            process::exit(130);
        }
    }
}
