//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate normalizer, directory, repositories and ledger into
//!   use-case level APIs.
//! - Keep web/CLI layers decoupled from storage details.
//!
//! # Invariants
//! - Services absorb identifier and conflict errors into structured
//!   reports; only persistence failures propagate as `Err`.

pub mod agent_service;
pub mod reconciler;

use crate::repo::agent_repo::RepoError;
use crate::repo::assignment_ledger::LedgerError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Persistence-level failure surfaced by a service operation.
///
/// Conflicts and invalid identifiers never appear here; those are
/// reported inside the operation's result payload.
#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    Ledger(LedgerError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Ledger(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Ledger(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<LedgerError> for ServiceError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}
