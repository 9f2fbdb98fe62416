//! Agent administration use-cases around the ledger.
//!
//! # Responsibility
//! - Expose the CRUD surface consumed by the web/CLI layer: listing
//!   agents, editing contact fields, deletion with assignment release.
//!
//! # Invariants
//! - Deleting an agent releases every owned code before the row goes;
//!   `owner_of` returns `None` for those codes afterwards.
//! - Assignment listings are read through the ledger and joined against
//!   the directory snapshot; nothing is cached on the agent.

use crate::directory::{MunicipalityDirectory, MunicipalityRecord};
use crate::model::agent::{Agent, AgentId};
use crate::repo::agent_repo::AgentRepository;
use crate::repo::assignment_ledger::AssignmentLedger;
use crate::service::ServiceResult;
use log::{info, warn};
use std::sync::Arc;

/// Contact/rendering fields editable after registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactUpdate {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub color: Option<String>,
}

/// Use-case service for agent administration.
pub struct AgentService<R, L> {
    agents: R,
    ledger: L,
    directory: Arc<MunicipalityDirectory>,
}

impl<R: AgentRepository, L: AssignmentLedger> AgentService<R, L> {
    pub fn new(agents: R, ledger: L, directory: Arc<MunicipalityDirectory>) -> Self {
        Self {
            agents,
            ledger,
            directory,
        }
    }

    /// Municipality records currently assigned to the agent.
    ///
    /// Codes with no directory entry are skipped with a warning; they can
    /// appear when the dataset shrank after the assignment was made.
    pub fn list_assignments(&self, agent: AgentId) -> ServiceResult<Vec<MunicipalityRecord>> {
        let codes = self.ledger.assignments_of(agent)?;
        let mut records = Vec::with_capacity(codes.len());
        for code in codes {
            match self.directory.lookup(&code) {
                Some(record) => records.push(record.clone()),
                None => warn!(
                    "event=list_assignments module=service status=unknown_code agent={} code={}",
                    agent, code
                ),
            }
        }
        Ok(records)
    }

    /// Applies a contact/color edit and refreshes `updated_at`.
    pub fn update_contact(&self, agent: AgentId, update: ContactUpdate) -> ServiceResult<Agent> {
        let mut record = self.require_agent(agent)?;
        if let Some(phone) = update.phone {
            record.phone = Some(phone);
        }
        if let Some(email) = update.email {
            record.email = Some(email);
        }
        if let Some(color) = update.color {
            record.color = color;
        }
        self.agents.update_agent(&record)?;
        Ok(record)
    }

    /// Deletes the agent, releasing all of its assignments first.
    pub fn delete_agent(&self, agent: AgentId) -> ServiceResult<()> {
        let released = self.ledger.release_all(agent)?;
        self.agents.delete_agent(agent)?;
        info!(
            "event=agent_deleted module=service status=ok agent={} released={}",
            agent, released
        );
        Ok(())
    }

    pub fn get_agent(&self, agent: AgentId) -> ServiceResult<Option<Agent>> {
        Ok(self.agents.get_agent(agent)?)
    }

    pub fn find_by_name(&self, name: &str) -> ServiceResult<Option<Agent>> {
        Ok(self.agents.find_by_name(name)?)
    }

    pub fn list_agents(&self) -> ServiceResult<Vec<Agent>> {
        Ok(self.agents.list_agents()?)
    }

    fn require_agent(&self, agent: AgentId) -> ServiceResult<Agent> {
        match self.agents.get_agent(agent)? {
            Some(record) => Ok(record),
            None => Err(crate::repo::agent_repo::RepoError::NotFound(agent).into()),
        }
    }
}
