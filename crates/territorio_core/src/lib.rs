//! Core domain logic for agent territory assignment.
//! This crate is the single source of truth for the one-owner-per-
//! municipality invariant.

pub mod db;
pub mod directory;
pub mod geo;
pub mod ident;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use directory::{
    CsvDirectoryLoader, DirectoryError, DirectoryLoader, DirectoryRow, MunicipalityDirectory,
    MunicipalityRecord, StaticDirectoryLoader,
};
pub use geo::{
    center_of, BoundaryProvider, Feature, FeatureCollection, FeatureProperties, Geometry,
    GeometryResolver, NoBoundaryProvider, ProviderError, StaticBoundaryProvider,
};
pub use ident::{NormalizedCode, Normalizer};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::agent::{Agent, AgentId, AgentValidationError, DEFAULT_AGENT_COLOR};
pub use repo::agent_repo::{AgentRepository, RepoError, RepoResult, SqliteAgentRepository};
pub use repo::assignment_ledger::{
    AssignmentLedger, LedgerError, LedgerResult, SqliteAssignmentLedger,
};
pub use service::agent_service::{AgentService, ContactUpdate};
pub use service::reconciler::{ReconcileReport, Reconciler, RejectedCode};
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
