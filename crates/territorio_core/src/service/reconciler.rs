//! Desired-set reconciliation against the assignment ledger.
//!
//! # Responsibility
//! - Turn an agent's submitted raw code list into a validated, minimal
//!   add/remove delta and apply it atomically.
//! - Report accepted/kept/removed/rejected/invalid codes as structured
//!   data; rendering belongs to the caller.
//!
//! # Invariants
//! - Duplicate submissions of one code collapse before classification;
//!   a unit listed twice never conflicts with itself.
//! - A late conflict (race lost between classification and apply) moves
//!   the code to `rejected` and retries the remaining delta; each
//!   conflicting code is removed permanently, so the retry loop is
//!   bounded by the size of the add set.
//! - An empty desired set for an existing agent is a valid clear-all.

use crate::directory::MunicipalityDirectory;
use crate::ident::Normalizer;
use crate::model::agent::{Agent, AgentId};
use crate::repo::agent_repo::AgentRepository;
use crate::repo::assignment_ledger::{AssignmentLedger, LedgerError};
use crate::service::{ServiceError, ServiceResult};
use log::{info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;

/// One code refused because another agent owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedCode {
    /// Canonical code that stays with its current owner.
    pub code: String,
    /// Display name of the blocking owner.
    pub owner_name: String,
}

/// Structured outcome of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Agent the submission was applied to (created on first submission).
    pub agent_id: AgentId,
    /// Codes newly assigned by this submission, submission order.
    pub accepted: Vec<String>,
    /// Codes already owned by this agent and still desired.
    pub kept: Vec<String>,
    /// Codes released because the desired set no longer includes them.
    pub removed: Vec<String>,
    /// Codes owned by other agents, with the blocking owner's name.
    pub rejected: Vec<RejectedCode>,
    /// Raw inputs that resolve to no directory record. Never mutated.
    pub invalid: Vec<String>,
}

/// Applies desired-set submissions under the exclusivity rule.
pub struct Reconciler<R, L> {
    agents: R,
    ledger: L,
    directory: Arc<MunicipalityDirectory>,
    normalizer: Normalizer,
}

impl<R: AgentRepository, L: AssignmentLedger> Reconciler<R, L> {
    pub fn new(
        agents: R,
        ledger: L,
        directory: Arc<MunicipalityDirectory>,
        normalizer: Normalizer,
    ) -> Self {
        Self {
            agents,
            ledger,
            directory,
            normalizer,
        }
    }

    /// Reconciles the agent's desired set against global ledger state.
    ///
    /// The agent is created on first submission under a new name and its
    /// `updated_at` refreshed on every submission.
    ///
    /// # Errors
    /// Only persistence failures abort; conflicts and unresolvable codes
    /// are absorbed into the report.
    pub fn reconcile(
        &self,
        agent_name: &str,
        desired_raw: &[String],
    ) -> ServiceResult<ReconcileReport> {
        let agent = self.upsert_agent(agent_name)?;

        // Resolve and deduplicate on post-normalization identity,
        // preserving first-occurrence order.
        let mut desired: Vec<String> = Vec::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut invalid: Vec<String> = Vec::new();
        for raw in desired_raw {
            let normalized = self.normalizer.normalize(raw);
            match self.directory.resolve(&normalized) {
                Some(record) => {
                    if seen.insert(record.code.clone()) {
                        desired.push(record.code.clone());
                    }
                }
                None => {
                    let trimmed = raw.trim().to_string();
                    if !invalid.contains(&trimmed) {
                        invalid.push(trimmed);
                    }
                }
            }
        }

        // Classify each valid code against the current owner.
        let mut to_add: Vec<String> = Vec::new();
        let mut kept: Vec<String> = Vec::new();
        let mut rejected: Vec<RejectedCode> = Vec::new();
        for code in &desired {
            match self.ledger.owner_of(code)? {
                None => to_add.push(code.clone()),
                Some(owner) if owner == agent.id => kept.push(code.clone()),
                Some(owner) => rejected.push(RejectedCode {
                    code: code.clone(),
                    owner_name: self.owner_display_name(owner)?,
                }),
            }
        }

        // Units previously owned but absent from the desired set are
        // released. Rejected codes were never ours, so they cannot
        // appear in the current set.
        let current = self.ledger.assignments_of(agent.id)?;
        let desired_kept: BTreeSet<String> =
            kept.iter().chain(to_add.iter()).cloned().collect();
        let to_remove: BTreeSet<String> =
            current.difference(&desired_kept).cloned().collect();

        let mut add_set: BTreeSet<String> = to_add.iter().cloned().collect();
        let mut attempts_left = add_set.len();
        loop {
            match self.ledger.apply(agent.id, &add_set, &to_remove) {
                Ok(()) => break,
                Err(LedgerError::Conflict { code, owner }) => {
                    // Race lost after classification: reject the code and
                    // retry the remaining delta. Removal guarantees the
                    // same code is never retried.
                    warn!(
                        "event=reconcile module=service status=late_conflict agent={} code={}",
                        agent.id, code
                    );
                    let removed_from_adds = add_set.remove(&code);
                    rejected.push(RejectedCode {
                        owner_name: self.owner_display_name(owner)?,
                        code,
                    });
                    if !removed_from_adds || attempts_left == 0 {
                        // The failed apply mutated nothing, so nothing in
                        // the remaining add set landed either.
                        add_set.clear();
                        break;
                    }
                    attempts_left -= 1;
                }
                Err(err) => return Err(ServiceError::Ledger(err)),
            }
        }

        let accepted: Vec<String> = to_add
            .into_iter()
            .filter(|code| add_set.contains(code))
            .collect();
        let removed: Vec<String> = to_remove.into_iter().collect();

        info!(
            "event=reconcile module=service status=ok agent={} accepted={} kept={} removed={} rejected={} invalid={}",
            agent.id,
            accepted.len(),
            kept.len(),
            removed.len(),
            rejected.len(),
            invalid.len()
        );

        Ok(ReconcileReport {
            agent_id: agent.id,
            accepted,
            kept,
            removed,
            rejected,
            invalid,
        })
    }

    fn upsert_agent(&self, name: &str) -> ServiceResult<Agent> {
        if let Some(existing) = self.agents.find_by_name(name)? {
            // Refresh the last-write timestamp for the new submission.
            self.agents.update_agent(&existing)?;
            return Ok(existing);
        }

        let agent = Agent::new(name);
        self.agents.create_agent(&agent)?;
        info!(
            "event=agent_created module=service status=ok agent={}",
            agent.id
        );
        Ok(agent)
    }

    fn owner_display_name(&self, owner: AgentId) -> ServiceResult<String> {
        let name = self
            .agents
            .get_agent(owner)?
            .map(|agent| agent.name)
            .unwrap_or_else(|| owner.to_string());
        Ok(name)
    }
}
