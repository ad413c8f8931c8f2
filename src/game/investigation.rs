//! Investigation ledger
//!
//! Append-only record of what the player did, found and concluded.

use crate::data::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered history of one session's investigation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestigationLedger {
    #[serde(rename = "investigation_actions", default)]
    pub actions: Vec<InvestigationAction>,

    /// Set semantics on evidence id, insertion order preserved
    #[serde(rename = "evidence_discovered", default)]
    pub evidence: Vec<DiscoveredEvidence>,

    #[serde(rename = "theories_submitted", default)]
    pub theories: Vec<Theory>,
}

impl InvestigationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_action(&mut self, action: InvestigationAction) {
        self.actions.push(action);
    }

    /// Record a discovery. Returns false, leaving the ledger untouched,
    /// if this evidence id was already discovered.
    pub fn record_evidence(&mut self, evidence: DiscoveredEvidence) -> bool {
        if self.has_discovered(evidence.id()) {
            return false;
        }
        self.evidence.push(evidence);
        true
    }

    pub fn record_theory(&mut self, theory: Theory) {
        self.theories.push(theory);
    }

    pub fn has_discovered(&self, evidence_id: &str) -> bool {
        self.evidence.iter().any(|e| e.id() == evidence_id)
    }

    pub fn discovered_ids(&self) -> HashSet<String> {
        self.evidence.iter().map(|e| e.id().to_string()).collect()
    }

    /// Snapshot of what the player knows, attached to a theory at submission
    pub fn context(&self) -> TheoryContext {
        TheoryContext {
            evidence_ids: self.evidence.iter().map(|e| e.id().to_string()).collect(),
            action_count: self.actions.len(),
        }
    }

    /// Percentage of a scenario's evidence uncovered so far
    pub fn progress(&self, total_evidence: usize) -> f32 {
        if total_evidence == 0 {
            return 0.0;
        }
        self.evidence.len() as f32 / total_evidence as f32 * 100.0
    }}
