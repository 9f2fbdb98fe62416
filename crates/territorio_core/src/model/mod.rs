//! Domain model for agents and their territorial assignments.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every agent is identified by a stable `AgentId`.
//! - Municipality codes are canonical 6-character strings; normalization
//!   happens before anything in this module sees them.

pub mod agent;
