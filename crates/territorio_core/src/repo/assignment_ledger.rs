//! Assignment ledger contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own the municipality-code -> agent ownership mapping.
//! - Apply add/remove deltas atomically with ownership re-validation.
//!
//! # Invariants
//! - At most one agent owns any code at any observation point.
//! - `apply` re-checks ownership inside the write transaction even when
//!   the caller pre-checked, closing the check-then-act race window.
//! - A failed `apply` leaves the ledger unchanged; there is no partial
//!   application.

use crate::db::{DbError, SharedConnection};
use crate::model::agent::AgentId;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::MutexGuard;
use uuid::Uuid;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors raised by ledger reads and mutations.
#[derive(Debug)]
pub enum LedgerError {
    /// A code in the add set is owned by a different agent. The whole
    /// call is rejected; nothing was applied.
    Conflict { code: String, owner: AgentId },
    Db(DbError),
    InvalidData(String),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict { code, owner } => {
                write!(f, "code {code} is already owned by agent {owner}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted assignment data: {message}")
            }
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Conflict { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for LedgerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Authoritative interface over code ownership.
///
/// Reads observe a consistent snapshot relative to any in-flight `apply`:
/// every operation serializes on the shared connection mutex.
pub trait AssignmentLedger {
    /// Codes currently owned by the agent.
    fn assignments_of(&self, agent: AgentId) -> LedgerResult<BTreeSet<String>>;
    /// Current owner of a code, if any.
    fn owner_of(&self, code: &str) -> LedgerResult<Option<AgentId>>;
    /// Atomically removes `to_remove` and adds `to_add` for the agent.
    ///
    /// # Errors
    /// - `Conflict` when any code in `to_add` is owned by another agent;
    ///   the transaction is rolled back in full.
    /// - `Db` on persistence failures; likewise rolled back.
    fn apply(
        &self,
        agent: AgentId,
        to_add: &BTreeSet<String>,
        to_remove: &BTreeSet<String>,
    ) -> LedgerResult<()>;
    /// Removes every assignment owned by the agent. Returns the count.
    fn release_all(&self, agent: AgentId) -> LedgerResult<usize>;
}

/// SQLite-backed ledger sharing one mutex-guarded connection.
pub struct SqliteAssignmentLedger {
    conn: SharedConnection,
}

impl SqliteAssignmentLedger {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned.into())
    }
}

impl AssignmentLedger for SqliteAssignmentLedger {
    fn assignments_of(&self, agent: AgentId) -> LedgerResult<BTreeSet<String>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT comune_code FROM assignments WHERE agent_uuid = ?1;")?;
        let mut rows = stmt.query([agent.to_string()])?;
        let mut codes = BTreeSet::new();
        while let Some(row) = rows.next()? {
            codes.insert(row.get::<_, String>(0)?);
        }
        Ok(codes)
    }

    fn owner_of(&self, code: &str) -> LedgerResult<Option<AgentId>> {
        let conn = self.lock()?;
        owner_in(&conn, code)
    }

    fn apply(
        &self,
        agent: AgentId,
        to_add: &BTreeSet<String>,
        to_remove: &BTreeSet<String>,
    ) -> LedgerResult<()> {
        if to_add.is_empty() && to_remove.is_empty() {
            return Ok(());
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Re-validate every addition before mutating anything, so a
        // conflict can never leave a half-applied batch behind.
        for code in to_add {
            if let Some(owner) = owner_in(&tx, code)? {
                if owner != agent {
                    return Err(LedgerError::Conflict {
                        code: code.clone(),
                        owner,
                    });
                }
            }
        }

        for code in to_remove {
            tx.execute(
                "DELETE FROM assignments WHERE comune_code = ?1 AND agent_uuid = ?2;",
                params![code, agent.to_string()],
            )?;
        }

        for code in to_add {
            // IGNORE covers codes the agent already owns; foreign owners
            // were rejected above under the same transaction.
            tx.execute(
                "INSERT OR IGNORE INTO assignments (comune_code, agent_uuid) VALUES (?1, ?2);",
                params![code, agent.to_string()],
            )?;
        }

        tx.commit()?;

        info!(
            "event=ledger_apply module=ledger status=ok agent={} added={} removed={}",
            agent,
            to_add.len(),
            to_remove.len()
        );
        Ok(())
    }

    fn release_all(&self, agent: AgentId) -> LedgerResult<usize> {
        let conn = self.lock()?;
        let released = conn.execute(
            "DELETE FROM assignments WHERE agent_uuid = ?1;",
            [agent.to_string()],
        )?;
        info!(
            "event=ledger_release_all module=ledger status=ok agent={} released={}",
            agent, released
        );
        Ok(released)
    }
}

fn owner_in(conn: &Connection, code: &str) -> LedgerResult<Option<AgentId>> {
    let owner_text: Option<String> = conn
        .query_row(
            "SELECT agent_uuid FROM assignments WHERE comune_code = ?1;",
            [code],
            |row| row.get(0),
        )
        .optional()?;
    parse_owner(owner_text, code)
}

fn parse_owner(owner_text: Option<String>, code: &str) -> LedgerResult<Option<AgentId>> {
    match owner_text {
        Some(text) => {
            let owner = Uuid::parse_str(&text).map_err(|_| {
                LedgerError::InvalidData(format!(
                    "invalid uuid value `{text}` in assignments.agent_uuid for code {code}"
                ))
            })?;
            Ok(Some(owner))
        }
        None => Ok(None),
    }
}
