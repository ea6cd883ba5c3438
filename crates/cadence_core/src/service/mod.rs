//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate catalog, picker, ledger and policy into the API the
//!   transport layer consumes.
//! - Keep transport layers decoupled from storage details.

pub mod task_service;
