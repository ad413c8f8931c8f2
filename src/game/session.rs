//! Session lifecycle
//!
//! [`SessionManager`] is the only mutation surface for a session. It holds
//! at most one active session and writes every change through to the
//! [`SessionStore`] before reporting success.

use super::store::SessionStore;
use crate::config::GameConfig;
use crate::data::*;
use crate::scoring::GameScore;
use crate::GameError;
use chrono::Utc;
use std::path::Path;
use tracing::{info, warn};

/// Drives one active session at a time
#[derive(Debug)]
pub struct SessionManager {
    store: SessionStore,
    initial_phase: String,
    current: Option<SessionState>,
}

impl SessionManager {
    pub fn new(store: SessionStore, initial_phase: &str) -> Self {
        Self {
            store,
            initial_phase: initial_phase.to_string(),
            current: None,
        }
    }

    pub fn from_config(config: &GameConfig) -> Result<Self, GameError> {
        Ok(Self::new(SessionStore::from_config(config)?, &config.initial_phase))
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The active session, if any
    pub fn current(&self) -> Option<&SessionState> {
        self.current.as_ref()
    }

    /// Start a new session and make it active
    pub fn create_session(
        &mut self,
        scenario_id: &str,
        scenario_name: &str,
        player_name: &str,
    ) -> Result<&SessionState, GameError> {
        let state = self
            .store
            .create(scenario_id, scenario_name, player_name, &self.initial_phase)?;
        Ok(&*self.current.insert(state))
    }

    /// Load a stored session and make it active. Completed sessions cannot be resumed.
    pub fn resume_session(&mut self, session_id: &str) -> Result<&SessionState, GameError> {
        let state = self.store.load(session_id).ok_or_else(|| {
            warn!(session_id, "Cannot resume missing session");
            GameError::SessionNotFound(session_id.to_string())
        })?;
        if state.is_completed {
            return Err(GameError::SessionCompleted(session_id.to_string()));
        }
        info!(session_id, actions = state.ledger.actions.len(), "Resumed session");
        Ok(&*self.current.insert(state))
    }

    /// Apply a change to the active session and persist it.
    ///
    /// The in-memory change is kept even when the save fails, so the caller
    /// can retry with [`SessionManager::save`].
    fn mutate<T>(&mut self, change: impl FnOnce(&mut SessionState) -> T) -> Result<T, GameError> {
        let state = self.current.as_mut().ok_or(GameError::NoActiveSession)?;
        if state.is_completed {
            return Err(GameError::InvalidState(format!(
                "session {} is already completed",
                state.session_id
            )));
        }
        let out = change(state);
        self.store.save(state)?;
        Ok(out)
    }

    /// Persist the active session as it stands
    pub fn save(&self) -> Result<(), GameError> {
        let state = self.current.as_ref().ok_or(GameError::NoActiveSession)?;
        self.store.save(state)
    }

    pub fn add_investigation_action(
        &mut self,
        action: &str,
        details: &str,
        response: Option<String>,
    ) -> Result<(), GameError> {
        self.mutate(|state| {
            let phase = state.current_phase.clone();
            state.ledger.record_action(InvestigationAction {
                timestamp: Utc::now(),
                action: action.to_string(),
                details: details.to_string(),
                response,
                phase,
            });
        })
    }

    /// Record a discovery. Returns false if the evidence was already known.
    pub fn add_evidence_discovered(&mut self, evidence: &EvidenceItem) -> Result<bool, GameError> {
        if self
            .current
            .as_ref()
            .is_some_and(|s| !s.is_completed && s.ledger.has_discovered(&evidence.id))
        {
            return Ok(false);
        }
        self.mutate(|state| {
            state
                .ledger
                .record_evidence(DiscoveredEvidence::new(evidence.clone(), Utc::now()))
        })
    }

    pub fn add_theory_submitted(&mut self, theory: TheoryComponents) -> Result<(), GameError> {
        self.mutate(|state| {
            let record = Theory::new(theory, &state.current_phase, state.ledger.context());
            state.ledger.record_theory(record);
        })
    }

    /// Returns the new hint count
    pub fn increment_hints_used(&mut self) -> Result<u32, GameError> {
        self.mutate(|state| {
            state.hints_used += 1;
            state.hints_used
        })
    }

    pub fn set_current_phase(&mut self, phase: &str) -> Result<(), GameError> {
        self.mutate(|state| state.current_phase = phase.to_string())
    }

    pub fn record_score_checkpoint(&mut self, label: &str, percentage: f64) -> Result<(), GameError> {
        self.mutate(|state| {
            let phase = state.current_phase.clone();
            state.score_checkpoints.push(ScoreCheckpoint {
                timestamp: Utc::now(),
                label: label.to_string(),
                percentage,
                phase,
            });
        })
    }

    pub fn set_session_notes(&mut self, notes: &str) -> Result<(), GameError> {
        self.mutate(|state| state.session_notes = notes.to_string())
    }

    /// Mark the active session finished and store its final score
    pub fn complete_session(&mut self, final_score: GameScore) -> Result<&SessionState, GameError> {
        let percentage = final_score.percentage;
        self.mutate(|state| {
            state.is_completed = true;
            state.completion_time = Some(Utc::now());
            state.final_score = Some(final_score);
        })?;

        let state = self.current.as_ref().ok_or(GameError::NoActiveSession)?;
        info!(session_id = %state.session_id, percentage, "Completed session");
        Ok(state)
    }

    /// Summary of the given session, or of the active one
    pub fn get_session_summary(&self, session_id: Option<&str>) -> Option<SessionSummary> {
        let now = Utc::now();
        match session_id {
            Some(id) if self.current.as_ref().is_some_and(|s| s.session_id.as_str() == id) => {
                self.current.as_ref().map(|s| s.summary(now))
            }
            Some(id) => self.store.load(id).map(|s| s.summary(now)),
            None => self.current.as_ref().map(|s| s.summary(now)),
        }
    }

    pub fn list_sessions(&self, include_completed: bool) -> Vec<SessionListing> {
        self.store.list(include_completed)
    }

    /// Delete a stored session, dropping it as the active one if it was
    pub fn delete_session(&mut self, session_id: &str) -> bool {
        let deleted = self.store.delete(session_id);
        if deleted && self.current.as_ref().is_some_and(|s| s.session_id.as_str() == session_id) {
            self.current = None;
        }
        deleted
    }

    pub fn export_session(&self, session_id: &str, path: &Path) -> Result<(), GameError> {
        self.store.export(session_id, path, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Scorer, SessionData};
    use crate::game::scenario::phishing_scenario;
    use tempfile::TempDir;

    fn manager() -> (TempDir, SessionManager) {
        let dir = TempDir::new().unwrap();
        let manager = SessionManager::from_config(&GameConfig::with_sessions_dir(dir.path())).unwrap();
        (dir, manager)
    }

    fn evidence(id: &str) -> EvidenceItem {
        EvidenceItem::new(id, EvidenceType::Email, Importance::Critical)
    }

    #[test]
    fn test_operations_need_active_session() {
        let (_dir, mut manager) = manager();
        assert!(matches!(
            manager.add_investigation_action("examine_logs", "", None),
            Err(GameError::NoActiveSession)
        ));
        assert!(matches!(manager.increment_hints_used(), Err(GameError::NoActiveSession)));
        assert!(manager.get_session_summary(None).is_none());
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let (_dir, mut manager) = manager();
        let id = manager.create_session("S1", "One", "Ana").unwrap().session_id.clone();

        manager.add_investigation_action("examine_logs", "check mail gateway", None).unwrap();
        manager.set_current_phase("Containment").unwrap();
        manager.add_investigation_action("analyze_network", "", Some("Nothing".into())).unwrap();
        manager.increment_hints_used().unwrap();
        manager.set_session_notes("suspect finance laptop").unwrap();

        let stored = manager.store().load(id.as_str()).unwrap();
        assert_eq!(&stored, manager.current().unwrap());
        assert_eq!(stored.ledger.actions[0].phase, "Initial Access");
        assert_eq!(stored.ledger.actions[1].phase, "Containment");
        assert_eq!(stored.hints_used, 1);
    }

    #[test]
    fn test_failed_save_keeps_change_for_retry() {
        let (dir, mut manager) = manager();
        let id = manager.create_session("S1", "One", "Ana").unwrap().session_id.clone();
        std::fs::remove_dir_all(dir.path()).unwrap();

        assert!(matches!(manager.increment_hints_used(), Err(GameError::Persistence(_))));
        assert_eq!(manager.current().unwrap().hints_used, 1);
        assert!(manager.store().load(id.as_str()).is_none());

        std::fs::create_dir_all(dir.path()).unwrap();
        manager.save().unwrap();
        assert_eq!(manager.store().load(id.as_str()).unwrap().hints_used, 1);
    }

    #[test]
    fn test_evidence_discovered_once() {
        let (_dir, mut manager) = manager();
        manager.create_session("S1", "One", "Ana").unwrap();
        assert!(manager.add_evidence_discovered(&evidence("E1")).unwrap());
        let first = manager.current().unwrap().ledger.evidence[0].discovered_at;
        assert!(!manager.add_evidence_discovered(&evidence("E1")).unwrap());

        let state = manager.current().unwrap();
        assert_eq!(state.ledger.evidence.len(), 1);
        assert_eq!(state.ledger.evidence[0].discovered_at, first);
    }

    #[test]
    fn test_theory_snapshot_and_checkpoint() {
        let (_dir, mut manager) = manager();
        manager.create_session("S1", "One", "Ana").unwrap();
        manager.add_evidence_discovered(&evidence("E1")).unwrap();
        manager
            .add_theory_submitted(TheoryComponents::narrative("phishing led to ransomware"))
            .unwrap();
        manager.add_evidence_discovered(&evidence("E2")).unwrap();
        manager.record_score_checkpoint("Theory 1", 42.0).unwrap();

        let state = manager.current().unwrap();
        assert_eq!(state.ledger.theories[0].context.evidence_ids, vec!["E1".to_string()]);
        assert_eq!(state.score_checkpoints[0].percentage, 42.0);
    }

    #[test]
    fn test_complete_then_resume_rejected() {
        let (_dir, mut manager) = manager();
        let id = manager.create_session("S1", "One", "Ana").unwrap().session_id.clone();
        let score = Scorer::new().score_game_session(&phishing_scenario(), &SessionData::default());
        let state = manager.complete_session(score.clone()).unwrap();
        assert!(state.is_completed);
        assert!(state.completion_time.is_some());

        assert!(matches!(manager.increment_hints_used(), Err(GameError::InvalidState(_))));
        assert!(matches!(
            manager.resume_session(id.as_str()),
            Err(GameError::SessionCompleted(_))
        ));

        let summary = manager.get_session_summary(Some(id.as_str())).unwrap();
        assert_eq!(summary.final_score, Some(score));
    }

    #[test]
    fn test_resume_and_delete() {
        let (dir, mut manager) = manager();
        let id = manager.create_session("S1", "One", "Ana").unwrap().session_id.clone();
        manager.add_investigation_action("other", "look around", None).unwrap();

        let mut other = SessionManager::from_config(&GameConfig::with_sessions_dir(dir.path())).unwrap();
        assert_eq!(other.resume_session(id.as_str()).unwrap().ledger.actions.len(), 1);
        assert!(matches!(other.resume_session("missing1"), Err(GameError::SessionNotFound(_))));

        assert!(manager.delete_session(id.as_str()));
        assert!(manager.current().is_none());
        assert!(!manager.delete_session(id.as_str()));
    }
}
