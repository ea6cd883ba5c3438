//! Unified domain model for templates, assignments and outcome events.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep derived summary shapes free of persistence concerns.
//!
//! # Invariants
//! - An assignment's skill always comes from its originating template.
//! - Summaries are recomputed on demand, never persisted as rows.

pub mod task;
