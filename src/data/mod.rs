//! Data structures for the game world
//!
//! Defines evidence, sessions, theories and the identifiers tying them together.

pub mod evidence;
pub mod session;
pub mod theory;

pub use evidence::*;
pub use session::*;
pub use theory::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How much an evidence item matters to solving the incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Importance {
    /// Chance that a matching investigation action reveals the item
    pub fn base_discovery_chance(&self) -> f64 {
        match self {
            Importance::Critical => 0.8,
            Importance::High => 0.6,
            Importance::Medium => 0.4,
            Importance::Low => 0.2,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Importance::Low => "◆",
            Importance::Medium => "▲",
            Importance::High => "●",
            Importance::Critical => "⬤",
        }
    }
}

/// Short session identifier, also the file stem of the persisted record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Fresh identifier: the first eight hex digits of a v4 UUID
    pub fn new() -> Self {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(8);
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
