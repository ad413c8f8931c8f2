//! Incidenter: tabletop incident response training
//!
//! Players investigate a simulated security incident, ask free-text
//! investigation questions, uncover evidence, submit theories about the
//! attack and receive a rubric-based score.
//!
//! # Game Mechanics
//!
//! - **Investigation**: Each action may reveal one undiscovered evidence item
//! - **Theories**: Structured explanations graded against a weighted rubric
//! - **Scoring**: Six weighted categories produce a final grade and feedback
//! - **Persistence**: Every mutation is written through to the session store
//!
//! # Architecture
//!
//! - `data` - Typed records for evidence, sessions and theories
//! - `game` - Scenarios, evidence discovery, session store and lifecycle
//! - `scoring` - Theory and full-session scoring engine
//! - `config` - Game configuration

pub mod config;
pub mod data;
pub mod game;
pub mod scoring;

pub use config::GameConfig;
pub use data::*;
pub use game::Game;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for boundary loaders (scenario and config files)
pub type Result<T> = anyhow::Result<T>;

/// Custom error types
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("No active session")]
    NoActiveSession,

    #[error("Cannot resume completed session: {0}")]
    SessionCompleted(String),

    #[error("Invalid game state: {0}")]
    InvalidState(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Session persistence failed: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("Malformed session record: {0}")]
    MalformedRecord(#[from] serde_json::Error),
}
