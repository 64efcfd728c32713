//! Data Transfer Objects
//!
//! This module contains DTOs exchanged between the orchestrator HTTP API and its
//! callers (client crate, CLI). DTOs are lightweight request/response shapes
//! layered over the domain entities.

pub mod document;
pub mod pipeline;
pub mod ruleset;
pub mod run;
