//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod document;
mod pipeline;
mod run;

pub use document::DocumentCommands;
pub use pipeline::PipelineCommands;
pub use run::RunCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Timestamp layout used in command output
pub(crate) const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Pipeline management
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Run inspection
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },
    /// Document registration
    Document {
        #[command(subcommand)]
        command: DocumentCommands,
    },
}

/// Route a command to its handler module
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Pipeline { command } => pipeline::handle_pipeline_command(command, config).await,
        Commands::Run { command } => run::handle_run_command(command, config).await,
        Commands::Document { command } => document::handle_document_command(command, config).await,
    }
}
