//! Docflow Core
//!
//! Core types shared by the Docflow document pipeline services.
//!
//! This crate contains:
//! - Domain types: Core business entities (Pipeline, PipelineRun, Document, etc.)
//! - DTOs: Request and query payloads exchanged between server, client and CLI

pub mod domain;
pub mod dto;
