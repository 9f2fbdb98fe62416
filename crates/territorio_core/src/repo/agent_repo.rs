//! Agent repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `agents` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Agent::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.

use crate::db::{DbError, SharedConnection};
use crate::model::agent::{Agent, AgentId, AgentValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::MutexGuard;
use uuid::Uuid;

const AGENT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    phone,
    email,
    color,
    updated_at
FROM agents";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for agent persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(AgentValidationError),
    Db(DbError),
    NotFound(AgentId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "agent not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted agent data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<AgentValidationError> for RepoError {
    fn from(value: AgentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for agent CRUD operations.
pub trait AgentRepository {
    fn create_agent(&self, agent: &Agent) -> RepoResult<AgentId>;
    /// Rewrites all mutable fields and refreshes `updated_at`.
    fn update_agent(&self, agent: &Agent) -> RepoResult<()>;
    fn get_agent(&self, id: AgentId) -> RepoResult<Option<Agent>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Agent>>;
    fn list_agents(&self) -> RepoResult<Vec<Agent>>;
    /// Hard delete. Assignments cascade at the storage level, but callers
    /// should release through the ledger first so the release is logged.
    fn delete_agent(&self, id: AgentId) -> RepoResult<()>;
}

/// SQLite-backed agent repository.
pub struct SqliteAgentRepository {
    conn: SharedConnection,
}

impl SqliteAgentRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned.into())
    }
}

impl AgentRepository for SqliteAgentRepository {
    fn create_agent(&self, agent: &Agent) -> RepoResult<AgentId> {
        agent.validate()?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO agents (uuid, name, phone, email, color) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                agent.id.to_string(),
                agent.name.as_str(),
                agent.phone.as_deref(),
                agent.email.as_deref(),
                agent.color.as_str(),
            ],
        )?;

        Ok(agent.id)
    }

    fn update_agent(&self, agent: &Agent) -> RepoResult<()> {
        agent.validate()?;

        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE agents
             SET
                name = ?1,
                phone = ?2,
                email = ?3,
                color = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?5;",
            params![
                agent.name.as_str(),
                agent.phone.as_deref(),
                agent.email.as_deref(),
                agent.color.as_str(),
                agent.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(agent.id));
        }

        Ok(())
    }

    fn get_agent(&self, id: AgentId) -> RepoResult<Option<Agent>> {
        let conn = self.lock()?;
        let agent = conn
            .query_row(
                &format!("{AGENT_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                |row| Ok(parse_agent_row(row)),
            )
            .optional()?
            .transpose()?;
        Ok(agent)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Agent>> {
        let conn = self.lock()?;
        let agent = conn
            .query_row(
                &format!("{AGENT_SELECT_SQL} WHERE name = ?1;"),
                [name.trim()],
                |row| Ok(parse_agent_row(row)),
            )
            .optional()?
            .transpose()?;
        Ok(agent)
    }

    fn list_agents(&self) -> RepoResult<Vec<Agent>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{AGENT_SELECT_SQL} ORDER BY name ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut agents = Vec::new();
        while let Some(row) = rows.next()? {
            agents.push(parse_agent_row(row)?);
        }
        Ok(agents)
    }

    fn delete_agent(&self, id: AgentId) -> RepoResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM agents WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_agent_row(row: &Row<'_>) -> RepoResult<Agent> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in agents.uuid"))
    })?;

    let agent = Agent {
        id,
        name: row.get("name")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        color: row.get("color")?,
        updated_at: row.get("updated_at")?,
    };
    agent.validate().map_err(|err| {
        RepoError::InvalidData(format!("agent row {uuid_text} fails validation: {err}"))
    })?;
    Ok(agent)
}
