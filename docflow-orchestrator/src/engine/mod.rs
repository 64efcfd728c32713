//! Pipeline execution engine
//!
//! Resolves pipeline nodes, dispatches them to their handlers and stages the
//! results. Run lifecycle bookkeeping lives in `service::run`.

mod context;
mod error;
mod ingestion;
pub mod node;
mod orchestrator;
mod processing;
mod staging;
mod validation;
pub mod vector_index;

pub use context::{ExecutionContext, RunInput};
pub use orchestrator::Orchestrator;
pub use staging::StagingSink;
pub use validation::RulesetRegistry;
