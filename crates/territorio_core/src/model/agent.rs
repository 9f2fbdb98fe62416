//! Agent domain model.
//!
//! # Responsibility
//! - Define the sales-agent record owning territorial assignments.
//! - Validate contact and rendering fields before persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another agent.
//! - `name` is the unique human-facing identity; submissions address
//!   agents by name, storage addresses them by `id`.
//! - Assignment membership is never cached on the agent; the ledger is
//!   the only source of truth for code ownership.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a sales agent.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type AgentId = Uuid;

/// Default map rendering color (orange), matching the legacy dataset.
pub const DEFAULT_AGENT_COLOR: &str = "#ff9800";

/// Sales agent owning a set of exclusive municipality assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Stable global ID used for ledger ownership and deletion cascade.
    pub id: AgentId,
    /// Unique display name. Trimmed, never empty.
    pub name: String,
    /// Optional contact phone number.
    pub phone: Option<String>,
    /// Optional contact email address.
    pub email: Option<String>,
    /// Map rendering color in `#rrggbb` form.
    pub color: String,
    /// Last-write timestamp in epoch milliseconds.
    pub updated_at: i64,
}

/// Validation failures for agent fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentValidationError {
    EmptyName,
    InvalidColor(String),
}

impl Display for AgentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "agent name must not be empty"),
            Self::InvalidColor(value) => {
                write!(f, "agent color must be `#rrggbb`, got `{value}`")
            }
        }
    }
}

impl Error for AgentValidationError {}

impl Agent {
    /// Creates a new agent with a generated stable ID and default color.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a new agent with a caller-provided stable ID.
    ///
    /// Used by persistence paths where identity already exists.
    pub fn with_id(id: AgentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into().trim().to_string(),
            phone: None,
            email: None,
            color: DEFAULT_AGENT_COLOR.to_string(),
            updated_at: 0,
        }
    }

    /// Validates field invariants before persistence.
    ///
    /// # Errors
    /// - `EmptyName` when the trimmed name is empty.
    /// - `InvalidColor` when the color is not a `#rrggbb` hex triplet.
    pub fn validate(&self) -> Result<(), AgentValidationError> {
        if self.name.trim().is_empty() {
            return Err(AgentValidationError::EmptyName);
        }
        if !is_hex_color(&self.color) {
            return Err(AgentValidationError::InvalidColor(self.color.clone()));
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::{Agent, AgentValidationError, DEFAULT_AGENT_COLOR};

    #[test]
    fn new_agent_uses_default_color_and_trims_name() {
        let agent = Agent::new("  Rossi  ");
        assert_eq!(agent.name, "Rossi");
        assert_eq!(agent.color, DEFAULT_AGENT_COLOR);
        assert!(agent.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_name() {
        let agent = Agent::new("   ");
        assert_eq!(agent.validate(), Err(AgentValidationError::EmptyName));
    }

    #[test]
    fn validate_rejects_malformed_color() {
        let mut agent = Agent::new("Bianchi");
        agent.color = "orange".to_string();
        assert!(matches!(
            agent.validate(),
            Err(AgentValidationError::InvalidColor(_))
        ));
    }
}
