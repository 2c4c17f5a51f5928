//! Job subcommand handlers for BirdSpot.

use birdspot_config::Config;
use birdspot_jobs::{Job, JobManager, TaskRegistry};
use tracing::info;
use uuid::Uuid;

use crate::cli::JobsAction;
use crate::services;

/// Handle jobs subcommands.
pub(crate) async fn handle_jobs_command(
    action: JobsAction,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    // Read-only commands never start jobs, so no task types are registered.
    let manager = services::job_manager(config, TaskRegistry::new()).await?;

    let result = match action {
        JobsAction::Show { id } => job_show(&manager, id).await,
        JobsAction::List { owner } => job_list(&manager, &owner).await,
    };

    manager.shutdown().await;
    result
}

async fn job_show(manager: &JobManager, id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
    let Some(job) = manager.get_by_id(&id).await? else {
        return Err(format!("Job not found: {}", id).into());
    };

    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}

async fn job_list(manager: &JobManager, owner: &str) -> Result<(), Box<dyn std::error::Error>> {
    let jobs = manager.get_by_owner(owner).await?;
    info!("Found {} jobs for '{}'", jobs.len(), owner);

    if jobs.is_empty() {
        println!("No jobs for owner '{}'", owner);
        return Ok(());
    }

    println!("{:<36}  {:<11}  {:<24}  CREATED", "ID", "STATE", "TASK");
    for job in &jobs {
        println!("{}", format_row(job));
    }
    Ok(())
}

fn format_row(job: &Job) -> String {
    format!(
        "{:<36}  {:<11}  {:<24}  {}",
        job.id(),
        job.state(),
        job.task().task_type,
        job.created_at().format("%Y-%m-%d %H:%M:%S")
    )
}
