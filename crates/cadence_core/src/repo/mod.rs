//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the ledger data-access contract consumed by services.
//! - Isolate SQLite query details from business orchestration.
//!
//! # Invariants
//! - Re-inserting an assignment with a known id is a no-op, never an
//!   error (idempotent plan regeneration).
//! - Recording an event also updates the referenced assignment's
//!   stored status.
//! - Read paths return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to DB transport errors.

pub mod ledger_repo;
