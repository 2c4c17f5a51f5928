//! CLI definitions for BirdSpot.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// BirdSpot CLI.
#[derive(Parser)]
#[command(name = "birdspot")]
#[command(about = "BirdSpot background jobs and result cache")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path [default: config/birdspot.toml if present]
    #[arg(short, long, global = true, env = "BIRDSPOT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Load and validate the configuration
    CheckConfig,

    /// Inspect persisted jobs
    Jobs {
        #[command(subcommand)]
        action: JobsAction,
    },

    /// Inspect cached values
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum JobsAction {
    /// Print one job as JSON
    Show {
        /// Job ID
        id: Uuid,
    },

    /// List the jobs of one owner, oldest first
    List {
        /// Owner identifier
        #[arg(long)]
        owner: String,
    },
}

#[derive(Subcommand)]
pub(crate) enum CacheAction {
    /// Read a raw key under the configured namespace
    Get {
        /// Raw key, e.g. `get_region_checklist:"US-NY"`
        raw_key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jobs_show() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from(["birdspot", "jobs", "show", &id.to_string()]).unwrap();
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Commands::Jobs { action: JobsAction::Show { id: parsed } } if parsed == id));
    }

    #[test]
    fn test_parse_jobs_list_with_config() {
        let cli = Cli::try_parse_from([
            "birdspot",
            "jobs",
            "list",
            "--owner",
            "alice",
            "--config",
            "/etc/birdspot.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/birdspot.toml")));
        assert!(matches!(cli.command, Commands::Jobs { action: JobsAction::List { ref owner } } if owner == "alice"));
    }

    #[test]
    fn test_parse_rejects_bad_job_id() {
        assert!(Cli::try_parse_from(["birdspot", "jobs", "show", "not-a-uuid"]).is_err());
    }

    #[test]
    fn test_parse_cache_get() {
        let cli = Cli::try_parse_from(["birdspot", "cache", "get", "sum:2:3"]).unwrap();
        assert!(matches!(cli.command, Commands::Cache { action: CacheAction::Get { ref raw_key } } if raw_key == "sum:2:3"));
    }

    #[test]
    fn test_parse_check_config() {
        let cli = Cli::try_parse_from(["birdspot", "check-config"]).unwrap();
        assert!(matches!(cli.command, Commands::CheckConfig));
    }
}
