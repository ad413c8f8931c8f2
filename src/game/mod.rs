//! Core game logic and state management

pub mod discovery;
pub mod investigation;
pub mod scenario;
pub mod session;
pub mod store;

pub use discovery::ActionCategory;
pub use scenario::{Difficulty, Scenario, ScenarioLibrary, Solution};
pub use session::SessionManager;
pub use store::SessionStore;

use crate::config::GameConfig;
use crate::data::*;
use crate::scoring::{GameScore, Scorer, SessionData, TheoryScore};
use crate::GameError;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// What one investigation turn produced
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub action: ActionCategory,
    /// Evidence revealed this turn, if any
    pub discovered: Option<EvidenceItem>,
    /// Text shown to the player
    pub response: String,
    /// Investigation actions left after this one
    pub remaining: u32,
}

/// One scenario being played: session lifecycle, discovery and scoring
/// wired together around an injected random source.
pub struct Game<R: Rng = StdRng> {
    scenario: Scenario,
    sessions: SessionManager,
    scorer: Scorer,
    config: GameConfig,
    rng: R,
}

impl Game<StdRng> {
    /// Create a game seeded from system entropy
    pub fn new(config: GameConfig, scenario: Scenario) -> Result<Self, GameError> {
        Self::with_rng(config, scenario, StdRng::from_entropy())
    }
}

impl<R: Rng> Game<R> {
    pub fn with_rng(config: GameConfig, scenario: Scenario, rng: R) -> Result<Self, GameError> {
        let sessions = SessionManager::from_config(&config)?;
        Ok(Self {
            scenario,
            sessions,
            scorer: Scorer::new(),
            config,
            rng,
        })
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut SessionManager {
        &mut self.sessions
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.sessions.current()
    }

    fn active(&self) -> Result<&SessionState, GameError> {
        self.sessions.current().ok_or(GameError::NoActiveSession)
    }

    /// Start a new session on this scenario
    pub fn start(&mut self, player_name: Option<&str>) -> Result<&SessionState, GameError> {
        let player = player_name
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(&self.config.default_player_name)
            .to_string();
        self.sessions
            .create_session(&self.scenario.id, &self.scenario.name, &player)
    }

    /// Resume a stored session. It must belong to this scenario.
    pub fn resume(&mut self, session_id: &str) -> Result<&SessionState, GameError> {
        if let Some(stored) = self.sessions.store().load(session_id) {
            if stored.scenario_id != self.scenario.id {
                return Err(GameError::InvalidState(format!(
                    "session {} belongs to scenario '{}', not '{}'",
                    session_id, stored.scenario_id, self.scenario.id
                )));
            }
        }
        self.sessions.resume_session(session_id)
    }

    pub fn max_investigations(&self) -> u32 {
        self.config.max_investigations(self.scenario.difficulty)
    }

    /// Investigation actions left in the active session
    pub fn remaining_investigations(&self) -> u32 {
        let used = self.session().map_or(0, |s| s.ledger.actions.len());
        self.max_investigations()
            .saturating_sub(u32::try_from(used).unwrap_or(u32::MAX))
    }

    /// Percentage of the scenario's evidence uncovered so far
    pub fn progress(&self) -> f32 {
        self.session()
            .map_or(0.0, |s| s.ledger.progress(self.scenario.evidence.len()))
    }

    /// Take one investigation action: record it and roll for evidence
    pub fn investigate(&mut self, action: ActionCategory, details: &str) -> Result<TurnOutcome, GameError> {
        let state = self.active()?;
        if self.remaining_investigations() == 0 {
            return Err(GameError::InvalidState(format!(
                "no investigation actions remaining in session {}",
                state.session_id
            )));
        }

        let known = state.ledger.discovered_ids();
        let discovered = discovery::resolve(action, details, &self.scenario, &known, &mut self.rng).cloned();

        let response = match &discovered {
            Some(item) => format!("Discovered: {}", item.brief()),
            None => "No new evidence found.".to_string(),
        };

        self.sessions
            .add_investigation_action(action.as_str(), details, Some(response.clone()))?;
        if let Some(item) = &discovered {
            self.sessions.add_evidence_discovered(item)?;
            info!(evidence = %item.id, action = %action, "Evidence discovered");
        } else {
            debug!(action = %action, "No evidence this turn");
        }

        Ok(TurnOutcome {
            action,
            discovered,
            response,
            remaining: self.remaining_investigations(),
        })
    }

    /// Record a theory and score it against the rubric
    pub fn submit_theory(&mut self, theory: TheoryComponents) -> Result<TheoryScore, GameError> {
        let score = self.scorer.score_theory(&theory);
        self.sessions.add_theory_submitted(theory)?;

        let count = self.active()?.ledger.theories.len();
        self.sessions
            .record_score_checkpoint(&format!("Theory {count}"), score.percentage)?;
        Ok(score)
    }

    /// Spend a hint; returns the total used
    pub fn use_hint(&mut self) -> Result<u32, GameError> {
        self.sessions.increment_hints_used()
    }

    pub fn set_phase(&mut self, phase: &str) -> Result<(), GameError> {
        self.sessions.set_current_phase(phase)
    }

    /// Score the whole session and complete it
    pub fn finish(&mut self) -> Result<GameScore, GameError> {
        let data = SessionData::from_session(self.active()?, &self.scenario, Utc::now());
        let score = self.scorer.score_game_session(&self.scenario, &data);
        self.sessions.complete_session(score.clone())?;
        Ok(score)
    }
}
