//! Session state and progression records

use super::SessionId;
use crate::game::investigation::InvestigationLedger;
use crate::scoring::GameScore;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One investigation step taken by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigationAction {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    #[serde(default)]
    pub details: String,
    /// Narrative returned to the player, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    pub phase: String,
}

/// Intermediate score recorded during play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCheckpoint {
    pub timestamp: DateTime<Utc>,
    pub label: String,
    pub percentage: f64,
    pub phase: String,
}

/// Full persisted state of one playthrough
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: SessionId,
    pub scenario_id: String,
    pub scenario_name: String,
    pub player_name: String,
    pub start_time: DateTime<Utc>,
    pub current_phase: String,

    /// Actions, discovered evidence and theories, in submission order
    #[serde(flatten)]
    pub ledger: InvestigationLedger,

    pub hints_used: u32,
    #[serde(default)]
    pub score_checkpoints: Vec<ScoreCheckpoint>,
    pub is_completed: bool,
    #[serde(default)]
    pub completion_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub final_score: Option<GameScore>,
    #[serde(default)]
    pub session_notes: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl SessionState {
    pub fn new(scenario_id: &str, scenario_name: &str, player_name: &str, phase: &str) -> Self {
        let now = Utc::now();
        let mut metadata = BTreeMap::new();
        metadata.insert("created_at".to_string(), serde_json::Value::String(now.to_rfc3339()));
        metadata.insert("version".to_string(), serde_json::Value::String("1.0".to_string()));

        Self {
            session_id: SessionId::new(),
            scenario_id: scenario_id.to_string(),
            scenario_name: scenario_name.to_string(),
            player_name: player_name.to_string(),
            start_time: now,
            current_phase: phase.to_string(),
            ledger: InvestigationLedger::default(),
            hints_used: 0,
            score_checkpoints: Vec::new(),
            is_completed: false,
            completion_time: None,
            final_score: None,
            session_notes: String::new(),
            metadata,
        }
    }

    /// Time spent so far, or in total once completed
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        self.completion_time.unwrap_or(now) - self.start_time
    }

    pub fn summary(&self, now: DateTime<Utc>) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            scenario_name: self.scenario_name.clone(),
            player_name: self.player_name.clone(),
            start_time: self.start_time,
            duration_minutes: self.elapsed(now).num_minutes(),
            is_completed: self.is_completed,
            current_phase: self.current_phase.clone(),
            investigation_actions: self.ledger.actions.len(),
            evidence_discovered: self.ledger.evidence.len(),
            theories_submitted: self.ledger.theories.len(),
            hints_used: self.hints_used,
            final_score: self.final_score.clone(),
        }
    }

    pub fn listing(&self) -> SessionListing {
        SessionListing {
            session_id: self.session_id.clone(),
            scenario_name: self.scenario_name.clone(),
            player_name: self.player_name.clone(),
            start_time: self.start_time,
            is_completed: self.is_completed,
            actions_count: self.ledger.actions.len(),
            evidence_count: self.ledger.evidence.len(),
            theories_count: self.ledger.theories.len(),
        }
    }
}

/// Derived statistics for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub scenario_name: String,
    pub player_name: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub is_completed: bool,
    pub current_phase: String,
    pub investigation_actions: usize,
    pub evidence_discovered: usize,
    pub theories_submitted: usize,
    pub hints_used: u32,
    pub final_score: Option<GameScore>,
}

/// One row of a session listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionListing {
    pub session_id: SessionId,
    pub scenario_name: String,
    pub player_name: String,
    pub start_time: DateTime<Utc>,
    pub is_completed: bool,
    pub actions_count: usize,
    pub evidence_count: usize,
    pub theories_count: usize,
}
