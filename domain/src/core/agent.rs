//! Agent identities participating in a tribunal run

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Role an agent plays in the pipeline (Value Object)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// Solves, reviews peers, and refines its own solution
    Solver,
    /// Picks the winning refined solution
    Judge,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Solver => "solver",
            AgentRole::Judge => "judge",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a single agent (Value Object)
///
/// Solvers are numbered from 1 and render as `solver_1`, `solver_2`, ...
/// The judge renders as `judge`. How many solvers exist is a configuration
/// value, see [`AgentId::solvers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentId {
    Solver(usize),
    Judge,
}

impl AgentId {
    /// The first `count` solver identities, in order.
    pub fn solvers(count: usize) -> Vec<AgentId> {
        (1..=count).map(AgentId::Solver).collect()
    }

    pub fn role(&self) -> AgentRole {
        match self {
            AgentId::Solver(_) => AgentRole::Solver,
            AgentId::Judge => AgentRole::Judge,
        }
    }

    pub fn is_solver(&self) -> bool {
        matches!(self, AgentId::Solver(_))
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentId::Solver(n) => write!(f, "solver_{}", n),
            AgentId::Judge => write!(f, "judge"),
        }
    }
}

/// Error returned when a string is not a known agent identity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown agent id: {0}")]
pub struct UnknownAgentId(pub String);

impl std::str::FromStr for AgentId {
    type Err = UnknownAgentId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "judge" {
            return Ok(AgentId::Judge);
        }
        s.strip_prefix("solver_")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .map(AgentId::Solver)
            .ok_or_else(|| UnknownAgentId(s.to_string()))
    }
}

impl Serialize for AgentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AgentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
