//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into request-level article APIs.
//! - Keep request layers (CLI, transports) decoupled from storage details.

pub mod article_service;
