//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services sit between the HTTP handlers and the record store.

pub mod document;
pub mod pipeline;
pub mod ruleset;
pub mod run;

// Re-export for convenience
pub use document as document_service;
pub use pipeline as pipeline_service;
pub use ruleset as ruleset_service;
pub use run::RunService;
