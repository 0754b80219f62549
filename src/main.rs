use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use first_rw::{
    config::Config,
    resource::FileResource,
    scenario::{completion_order, Driver, Scenario},
    shared::SharedResource,
    task::Kind,
};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let config = match Config::from_args() {
        Ok(Some(config)) => config,
        Ok(None) => return ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_tracing(config.verbose) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}

fn run(config: &Config) -> Result<()> {
    let resource = FileResource::open(&config.file)?;
    info!(path = %resource.path().display(), "opened shared resource");

    let mut driver = Driver::new(Arc::new(SharedResource::new(resource)), config.size);
    if let Some(seed) = config.seed {
        driver = driver.seeded(seed);
    }
    let reports = config
        .scenario
        .run(&mut driver, config.counts())
        .with_context(|| format!("{:?} scenario failed", config.scenario))?;

    let readers = reports.iter().filter(|r| r.kind == Kind::Reader).count();
    info!(readers, writers = reports.len() - readers, "summary");
    if config.scenario == Scenario::Flood {
        for (rank, report) in completion_order(&reports)
            .iter()
            .enumerate()
            .filter(|(_, r)| r.kind == Kind::Writer)
        {
            info!(
                writer = report.id,
                readers_before_it = rank,
                "writer finished after {rank} of {readers} readers"
            );
        }
    }

    driver
        .finish()
        .context("shared resource still in use after every task was joined")?;
    Ok(())
}
