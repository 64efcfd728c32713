//! Core domain types
//!
//! This module contains the core domain structures used across Docflow services.
//! These types represent the fundamental business entities and are shared between
//! the orchestrator (persistence and execution) and the client/CLI (presentation).

pub mod document;
pub mod pipeline;
pub mod run;
pub mod staging;
pub mod validation;

/// Error returned when a stored or user supplied tag does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl std::fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}
