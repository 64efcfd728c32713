//! Document command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use docflow_client::DocflowClient;
use docflow_core::domain::document::SourceType;
use docflow_core::dto::document::CreateDocument;
use uuid::Uuid;

use super::TIME_FORMAT;
use crate::config::Config;

/// Document subcommands
#[derive(Subcommand)]
pub enum DocumentCommands {
    /// Register a document for later runs
    Register {
        /// How the document entered the system
        #[arg(short, long, default_value = "file_path")]
        source_type: SourceType,

        /// Caller-side reference
        #[arg(short, long)]
        external_ref: Option<String>,

        /// Original file name
        #[arg(short, long)]
        file_name: Option<String>,

        /// MIME type
        #[arg(short, long)]
        mime_type: Option<String>,

        /// Where the document content lives
        #[arg(short = 'u', long)]
        storage_uri: Option<String>,

        /// Free-form JSON metadata
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Show a document and its chunks
    Show {
        /// Document ID
        id: Uuid,
    },
}

/// Route document subcommands to their handlers
pub async fn handle_document_command(command: DocumentCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        DocumentCommands::Register {
            source_type,
            external_ref,
            file_name,
            mime_type,
            storage_uri,
            metadata,
        } => {
            let metadata = metadata
                .map(|raw| serde_json::from_str::<serde_json::Value>(&raw))
                .transpose()
                .context("--metadata must be valid JSON")?;
            let req = CreateDocument {
                source_type,
                external_ref,
                file_name,
                mime_type,
                storage_uri,
                metadata,
            };
            register_document(&client, req).await
        }
        DocumentCommands::Show { id } => show_document(&client, id).await,
    }
}

async fn register_document(client: &DocflowClient, req: CreateDocument) -> Result<()> {
    let document = client.register_document(req).await?;

    println!("{}", "✓ Document registered successfully!".green().bold());
    println!("  ID:     {}", document.id.to_string().cyan());
    println!("  Source: {}", document.source_type.as_str().dimmed());
    if let Some(uri) = &document.storage_uri {
        println!("  URI:    {}", uri.dimmed());
    }

    Ok(())
}

async fn show_document(client: &DocflowClient, id: Uuid) -> Result<()> {
    let details = client.get_document(id).await?;
    let document = &details.document;

    println!("{}", "Document Details:".bold());
    println!("  ID:       {}", document.id.to_string().cyan());
    println!("  Source:   {}", document.source_type);
    if let Some(name) = &document.file_name {
        println!("  File:     {}", name);
    }
    if let Some(run_id) = document.pipeline_run_id {
        println!("  Run:      {}", run_id.to_string().dimmed());
    }
    println!("  Created:  {}", document.created_at.format(TIME_FORMAT));

    println!(
        "\n{}",
        format!("Chunks ({}):", details.chunks.len()).bold()
    );
    for chunk in &details.chunks {
        println!("  [{}] {}", chunk.chunk_index, chunk.content);
    }

    Ok(())
}
