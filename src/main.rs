//! BirdSpot - background jobs and result cache
//!
//! Operator CLI for inspecting BirdSpot's job store and cache.

mod cli;
mod cmd_cache;
mod cmd_jobs;
mod services;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use birdspot_config::{Config, ConfigLoader, ConfigValidator, LoggingSection};

use crate::cli::{Cli, Commands};
use crate::cmd_cache::handle_cache_command;
use crate::cmd_jobs::handle_jobs_command;

fn init_tracing(logging: &LoggingSection) -> Result<(), Box<dyn std::error::Error>> {
    let level = match logging.level.trim() {
        "" => "info",
        level => level,
    };

    // RUST_LOG wins over the configured level
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match &logging.directory {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("birdspot")
                .filename_suffix("log")
                .max_log_files(30)
                .build(log_dir)?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // Keep the writer alive for the program duration
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        // Console output goes to stderr so command output stays pipeable
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(true),
        )
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    init_tracing(&config.logging)?;

    match cli.command {
        Commands::CheckConfig => check_config(&config),
        Commands::Jobs { action } => {
            ensure_valid(&config)?;
            handle_jobs_command(action, &config).await
        }
        Commands::Cache { action } => {
            ensure_valid(&config)?;
            handle_cache_command(action, &config).await
        }
    }
}

/// Validate and report every problem, failing when there are errors.
fn check_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config)?;

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    if !result.is_valid() {
        return Err(format!("Configuration has {} error(s)", result.errors.len()).into());
    }

    println!("Configuration OK");
    println!("  jobs.directory:  {}", config.jobs.directory.display());
    println!("  jobs.workers:    {}", config.jobs.pool.max_workers);
    println!("  cache.backend:   {}", config.cache.backend);
    println!("  cache.directory: {}", config.cache.directory.display());
    println!("  cache.namespace: {}:v{}", config.cache.prefix, config.cache.version);
    Ok(())
}

fn ensure_valid(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::ensure_valid(config)?;
    for warning in &result.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    info!("BirdSpot v{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
