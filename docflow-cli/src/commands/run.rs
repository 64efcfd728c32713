//! Run command handlers
//!
//! Inspects run status, recent runs and the artifacts a run staged.

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use docflow_client::DocflowClient;
use docflow_core::domain::run::{PipelineRun, RunStatus};
use docflow_core::domain::staging::StagedData;
use docflow_core::dto::run::RunFilter;

use super::TIME_FORMAT;
use crate::config::Config;
use crate::id_resolver::{resolve_pipeline_id, resolve_run_id};

/// Run subcommands
#[derive(Subcommand)]
pub enum RunCommands {
    /// Show a run's status and result
    Status {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// List recent runs
    List {
        /// Only runs of this pipeline (ID or prefix)
        #[arg(short, long)]
        pipeline: Option<String>,

        /// Only runs in this status
        #[arg(short, long)]
        status: Option<RunStatus>,

        /// Maximum number of runs
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show the data a run staged
    Staged {
        /// Run ID or unambiguous prefix
        id: String,
    },
}

/// Route run subcommands to their handlers
pub async fn handle_run_command(command: RunCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        RunCommands::Status { id } => show_run(&client, &id).await,
        RunCommands::List {
            pipeline,
            status,
            limit,
        } => {
            let pipeline_id = match pipeline {
                Some(p) => Some(resolve_pipeline_id(&client, &p).await?),
                None => None,
            };
            let filter = RunFilter {
                pipeline_id,
                status,
                limit,
            };
            list_runs(&client, &filter).await
        }
        RunCommands::Staged { id } => list_staged(&client, &id).await,
    }
}

async fn show_run(client: &DocflowClient, id: &str) -> Result<()> {
    let uuid = resolve_run_id(client, id).await?;
    let run = client.get_run(uuid).await?;

    println!("{}", "Run Details:".bold());
    print_run_details(&run);

    Ok(())
}

async fn list_runs(client: &DocflowClient, filter: &RunFilter) -> Result<()> {
    let runs = client.list_runs(filter).await?;

    if runs.is_empty() {
        println!("{}", "No runs found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} run(s):", runs.len()).bold());
    println!();
    for run in runs {
        println!(
            "  {} {} {}",
            "▸".cyan(),
            run.id.to_string().bold(),
            colorize_status(run.status)
        );
        println!("    Pipeline: {}", run.pipeline_id.to_string().dimmed());
        println!(
            "    Created:  {}",
            run.created_at.format(TIME_FORMAT).to_string().dimmed()
        );
        if let Some(input_ref) = &run.input_ref {
            println!("    Input:    {}", input_ref.dimmed());
        }
        println!();
    }

    Ok(())
}

async fn list_staged(client: &DocflowClient, id: &str) -> Result<()> {
    let uuid = resolve_run_id(client, id).await?;
    let staged = client.list_staged(uuid).await?;

    if staged.is_empty() {
        println!("{}", "Run staged nothing.".yellow());
        return Ok(());
    }

    for item in &staged {
        print_staged(item)?;
    }

    Ok(())
}

/// Print a run with its summary, shared with `pipeline run`
pub(super) fn print_run_details(run: &PipelineRun) {
    println!("  ID:        {}", run.id.to_string().cyan());
    println!("  Pipeline:  {}", run.pipeline_id.to_string().dimmed());
    println!("  Status:    {}", colorize_status(run.status));
    println!("  Created:   {}", run.created_at.format(TIME_FORMAT));
    if let Some(started) = run.started_at {
        println!("  Started:   {}", started.format(TIME_FORMAT));
    }
    if let Some(completed) = run.completed_at {
        println!("  Completed: {}", completed.format(TIME_FORMAT));
    }
    if let Some(input_ref) = &run.input_ref {
        println!("  Input:     {}", input_ref);
    }
    if let Some(error) = &run.error_message {
        println!("  Error:     {}", error.red());
    }

    if let Some(summary) = &run.result_summary {
        println!("\n{}", "Result:".bold());
        println!("  Chunks:     {}", summary.chunk_count);
        if let Some(output) = &summary.llm_output {
            println!("  Mode:       {} ({})", output.mode, output.model_name.dimmed());
            println!("  Output:     {}", output.result);
        }
        if let Some(report) = &summary.validation_report {
            println!(
                "  Validation: {} [{}]",
                report.status.as_str().bold(),
                report.ruleset.dimmed()
            );
            for issue in &report.issues {
                println!("    - {}", issue.yellow());
            }
        }
    }
}

fn print_staged(item: &StagedData) -> Result<()> {
    println!(
        "  {} {} {}",
        "▸".cyan(),
        item.payload_type.bold(),
        item.validation_status.as_str().dimmed()
    );
    println!("    ID:       {}", item.id.to_string().dimmed());
    if let Some(document_id) = item.document_id {
        println!("    Document: {}", document_id.to_string().dimmed());
    }
    for issue in &item.issues {
        println!("    - {}", issue.yellow());
    }
    println!("{}", serde_json::to_string_pretty(&item.payload)?);
    println!();

    Ok(())
}

fn colorize_status(status: RunStatus) -> ColoredString {
    match status {
        RunStatus::Queued => status.as_str().yellow(),
        RunStatus::Running => status.as_str().blue(),
        RunStatus::Succeeded => status.as_str().green(),
        RunStatus::Failed => status.as_str().red(),
    }
}
