//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for agents and the
//!   assignment ledger.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Agent::validate()` before persistence.
//! - The assignment ledger is the only writer of code ownership; no
//!   other component touches the `assignments` table.

pub mod agent_repo;
pub mod assignment_ledger;
