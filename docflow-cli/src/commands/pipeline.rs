//! Pipeline command handlers
//!
//! Handles pipeline creation from a JSON definition file, listing, viewing,
//! deletion, and triggering runs.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use docflow_client::DocflowClient;
use docflow_core::domain::pipeline::{Pipeline, UseCase};
use docflow_core::dto::pipeline::{CreatePipeline, PipelineFilter, PipelineSummary};
use docflow_core::dto::run::CreateRun;
use uuid::Uuid;

use super::TIME_FORMAT;
use super::run::print_run_details;
use crate::config::Config;
use crate::id_resolver::resolve_pipeline_id;

/// Pipeline subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// Create a pipeline from a JSON file
    Create {
        /// Path to a JSON file with name, use_case, description and definition
        #[arg(short, long)]
        from_file: String,

        /// Override the name from the file
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List pipelines
    List {
        /// Only pipelines for this use case
        #[arg(short, long)]
        use_case: Option<UseCase>,

        /// Include inactive pipelines
        #[arg(short, long)]
        all: bool,
    },
    /// Show pipeline details
    Show {
        /// Pipeline ID or unambiguous prefix
        id: String,
    },
    /// Delete a pipeline and its runs
    Delete {
        /// Pipeline ID or unambiguous prefix
        id: String,
    },
    /// Trigger a run and wait for its outcome
    Run {
        /// Pipeline ID or unambiguous prefix
        id: String,

        /// Raw text to process
        #[arg(short, long)]
        text: Option<String>,

        /// Path of a file to ingest
        #[arg(short, long)]
        file_path: Option<String>,

        /// ID of an already registered document
        #[arg(short, long)]
        document_id: Option<Uuid>,

        /// Caller reference stored on the run
        #[arg(short, long)]
        input_ref: Option<String>,
    },
}

/// Route pipeline subcommands to their handlers
pub async fn handle_pipeline_command(command: PipelineCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        PipelineCommands::Create { from_file, name } => {
            create_pipeline(&client, &from_file, name).await
        }
        PipelineCommands::List { use_case, all } => {
            let filter = PipelineFilter {
                use_case,
                active_only: Some(!all),
            };
            list_pipelines(&client, &filter).await
        }
        PipelineCommands::Show { id } => show_pipeline(&client, &id).await,
        PipelineCommands::Delete { id } => delete_pipeline(&client, &id).await,
        PipelineCommands::Run {
            id,
            text,
            file_path,
            document_id,
            input_ref,
        } => {
            let req = CreateRun {
                input_ref,
                document_id,
                file_path,
                text_payload: text,
            };
            run_pipeline(&client, &id, req).await
        }
    }
}

async fn create_pipeline(
    client: &DocflowClient,
    path: &str,
    name_override: Option<String>,
) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pipeline file: {}", path))?;
    let mut req: CreatePipeline = serde_json::from_str(&content)
        .with_context(|| format!("Invalid pipeline definition in {}", path))?;

    if let Some(name) = name_override {
        req.name = name;
    }

    let pipeline = client.create_pipeline(req).await?;

    println!("{}", "✓ Pipeline created successfully!".green().bold());
    println!("  ID:       {}", pipeline.id.to_string().cyan());
    println!("  Name:     {}", pipeline.name.bold());
    println!("  Use case: {}", pipeline.use_case.as_str().dimmed());
    println!(
        "  Nodes:    {}",
        node_types(&pipeline).join(" → ").dimmed()
    );

    Ok(())
}

async fn list_pipelines(client: &DocflowClient, filter: &PipelineFilter) -> Result<()> {
    let pipelines = client.list_pipelines(filter).await?;

    if pipelines.is_empty() {
        println!("{}", "No pipelines found.".yellow());
    } else {
        println!(
            "{}",
            format!("Found {} pipeline(s):", pipelines.len()).bold()
        );
        println!();
        for pipeline in pipelines {
            print_pipeline_summary(&pipeline);
        }
    }

    Ok(())
}

async fn show_pipeline(client: &DocflowClient, id: &str) -> Result<()> {
    let uuid = resolve_pipeline_id(client, id).await?;
    let pipeline = client.get_pipeline(uuid).await?;

    print_pipeline_details(&pipeline)
}

async fn delete_pipeline(client: &DocflowClient, id: &str) -> Result<()> {
    let uuid = resolve_pipeline_id(client, id).await?;

    client.delete_pipeline(uuid).await?;

    println!(
        "{}",
        format!("✓ Pipeline {} deleted successfully!", uuid)
            .green()
            .bold()
    );

    Ok(())
}

async fn run_pipeline(client: &DocflowClient, id: &str, req: CreateRun) -> Result<()> {
    let uuid = resolve_pipeline_id(client, id).await?;

    let run = client.trigger_run(uuid, req).await?;

    println!("{}", "✓ Run finished".green().bold());
    print_run_details(&run);

    Ok(())
}

fn node_types(pipeline: &Pipeline) -> Vec<&str> {
    pipeline
        .definition
        .nodes
        .iter()
        .map(|n| n.node_type.as_str())
        .collect()
}

fn print_pipeline_summary(pipeline: &PipelineSummary) {
    let marker = if pipeline.is_active {
        "▸".cyan()
    } else {
        "▹".dimmed()
    };
    println!("  {} {}", marker, pipeline.name.bold());
    println!("    ID:       {}", pipeline.id.to_string().dimmed());
    println!("    Use case: {}", pipeline.use_case.as_str().dimmed());
    println!("    Nodes:    {}", pipeline.node_count.to_string().dimmed());
    println!(
        "    Created:  {}",
        pipeline
            .created_at
            .format(TIME_FORMAT)
            .to_string()
            .dimmed()
    );
    if !pipeline.is_active {
        println!("    {}", "inactive".yellow());
    }
    if let Some(desc) = &pipeline.description {
        println!("    Description: {}", desc.dimmed());
    }
    println!();
}

fn print_pipeline_details(pipeline: &Pipeline) -> Result<()> {
    println!("{}", "Pipeline Details:".bold());
    println!("  ID:          {}", pipeline.id.to_string().cyan());
    println!("  Name:        {}", pipeline.name.bold());
    if let Some(desc) = &pipeline.description {
        println!("  Description: {}", desc);
    }
    println!("  Use case:    {}", pipeline.use_case);
    println!("  Active:      {}", pipeline.is_active);
    println!("  Created:     {}", pipeline.created_at.format(TIME_FORMAT));
    println!("  Updated:     {}", pipeline.updated_at.format(TIME_FORMAT));

    println!("\n{}", "Definition:".bold());
    println!("{}", "─".repeat(80).dimmed());
    println!("{}", serde_json::to_string_pretty(&pipeline.definition)?);
    println!("{}", "─".repeat(80).dimmed());

    Ok(())
}
