//! Player theories about the incident

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The rubric aspects a theory is broken into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TheoryAspect {
    InitialAccess,
    TechniquesUsed,
    Timeline,
    Objective,
    Attribution,
    Impact,
    AdditionalIocs,
}

impl TheoryAspect {
    /// Rubric order
    pub const ALL: [TheoryAspect; 7] = [
        TheoryAspect::InitialAccess,
        TheoryAspect::TechniquesUsed,
        TheoryAspect::Timeline,
        TheoryAspect::Objective,
        TheoryAspect::Attribution,
        TheoryAspect::Impact,
        TheoryAspect::AdditionalIocs,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TheoryAspect::InitialAccess => "initial_access",
            TheoryAspect::TechniquesUsed => "techniques_used",
            TheoryAspect::Timeline => "timeline",
            TheoryAspect::Objective => "objective",
            TheoryAspect::Attribution => "attribution",
            TheoryAspect::Impact => "impact",
            TheoryAspect::AdditionalIocs => "additional_iocs",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TheoryAspect::InitialAccess => "Initial Access",
            TheoryAspect::TechniquesUsed => "Techniques Used",
            TheoryAspect::Timeline => "Timeline",
            TheoryAspect::Objective => "Objective",
            TheoryAspect::Attribution => "Attribution",
            TheoryAspect::Impact => "Impact",
            TheoryAspect::AdditionalIocs => "Additional Iocs",
        }
    }
}

/// Free-text answers keyed by rubric aspect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TheoryComponents {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_access: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub techniques_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_iocs: Option<String>,
    /// Unstructured narrative, for theories submitted as a single block of text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

impl TheoryComponents {
    /// A theory submitted as one block of free text
    pub fn narrative(text: &str) -> Self {
        Self {
            narrative: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn with(mut self, aspect: TheoryAspect, text: &str) -> Self {
        *self.slot_mut(aspect) = Some(text.to_string());
        self
    }

    pub fn get(&self, aspect: TheoryAspect) -> Option<&str> {
        let slot = match aspect {
            TheoryAspect::InitialAccess => &self.initial_access,
            TheoryAspect::TechniquesUsed => &self.techniques_used,
            TheoryAspect::Timeline => &self.timeline,
            TheoryAspect::Objective => &self.objective,
            TheoryAspect::Attribution => &self.attribution,
            TheoryAspect::Impact => &self.impact,
            TheoryAspect::AdditionalIocs => &self.additional_iocs,
        };
        slot.as_deref()
    }

    fn slot_mut(&mut self, aspect: TheoryAspect) -> &mut Option<String> {
        match aspect {
            TheoryAspect::InitialAccess => &mut self.initial_access,
            TheoryAspect::TechniquesUsed => &mut self.techniques_used,
            TheoryAspect::Timeline => &mut self.timeline,
            TheoryAspect::Objective => &mut self.objective,
            TheoryAspect::Attribution => &mut self.attribution,
            TheoryAspect::Impact => &mut self.impact,
            TheoryAspect::AdditionalIocs => &mut self.additional_iocs,
        }
    }

    /// True when the aspect holds something other than whitespace
    pub fn is_filled(&self, aspect: TheoryAspect) -> bool {
        self.get(aspect).is_some_and(|s| !s.trim().is_empty())
    }

    /// Every answer plus the narrative, joined for keyword matching
    pub fn full_text(&self) -> String {
        TheoryAspect::ALL
            .iter()
            .filter_map(|a| self.get(*a))
            .chain(self.narrative.as_deref())
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Total characters across all answers
    pub fn total_len(&self) -> usize {
        TheoryAspect::ALL
            .iter()
            .filter_map(|a| self.get(*a))
            .chain(self.narrative.as_deref())
            .map(|s| s.chars().count())
            .sum()
    }
}

/// What the player knew when submitting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TheoryContext {
    pub evidence_ids: Vec<String>,
    pub action_count: usize,
}

/// A submitted theory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theory {
    pub timestamp: DateTime<Utc>,
    pub theory: TheoryComponents,
    pub phase: String,
    #[serde(default)]
    pub context: TheoryContext,
}

impl Theory {
    pub fn new(theory: TheoryComponents, phase: &str, context: TheoryContext) -> Self {
        Self {
            timestamp: Utc::now(),
            theory,
            phase: phase.to_string(),
            context,
        }
    }
}
