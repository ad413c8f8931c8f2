//! Scenario definitions for incident response exercises
//!
//! A scenario is the authored incident: metadata, the evidence catalog
//! players can uncover, and optionally the ground truth theories are
//! graded against. Scenarios are read-only once loaded.

use crate::data::*;
use crate::GameError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Default expected play time when a scenario does not declare one
pub const DEFAULT_ESTIMATED_DURATION_SECS: u64 = 3600;

/// Scenario difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    /// Map an authored label; unknown labels count as intermediate
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "easy" | "beginner" => Difficulty::Beginner,
            "medium" | "intermediate" => Difficulty::Intermediate,
            "hard" | "advanced" => Difficulty::Advanced,
            "expert" => Difficulty::Expert,
            _ => Difficulty::Intermediate,
        }
    }
}

/// Ground truth used to grade theories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Solution {
    pub attack_type: String,
    pub attack_vector: String,
    pub key_indicators: Vec<String>,
}

/// A complete incident scenario
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// Authored difficulty label, kept for display
    pub difficulty_label: String,
    /// Human-readable duration, e.g. "45-90 minutes"
    pub duration_label: Option<String>,
    /// Expected play time used for time-efficiency scoring
    pub estimated_duration_secs: u64,

    /// All evidence that can be discovered, in authored order
    pub evidence: Vec<EvidenceItem>,

    pub solution: Option<Solution>,
    pub required_investigation_areas: Vec<String>,
}

impl Scenario {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            difficulty: Difficulty::default(),
            difficulty_label: "intermediate".to_string(),
            duration_label: None,
            estimated_duration_secs: DEFAULT_ESTIMATED_DURATION_SECS,
            evidence: Vec::new(),
            solution: None,
            required_investigation_areas: Vec::new(),
        }
    }

    pub fn with_evidence(mut self, items: Vec<EvidenceItem>) -> Self {
        self.evidence = items;
        self
    }

    pub fn with_solution(mut self, solution: Solution) -> Self {
        self.solution = Some(solution);
        self
    }

    pub fn with_difficulty(mut self, label: &str) -> Self {
        self.difficulty = Difficulty::from_label(label);
        self.difficulty_label = label.to_string();
        self
    }

    pub fn critical_evidence(&self) -> impl Iterator<Item = &EvidenceItem> {
        self.evidence.iter().filter(|e| e.importance == Importance::Critical)
    }

    /// Parse a scenario from its YAML document form
    pub fn from_yaml_str(yaml: &str) -> crate::Result<Self> {
        let doc: ScenarioDocument = serde_yaml::from_str(yaml).context("Failed to parse scenario YAML")?;
        Ok(Self::try_from(doc)?)
    }

    /// Load a scenario file from disk
    pub fn load(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_yaml_str(&contents).with_context(|| format!("Invalid scenario {}", path.display()))
    }
}

/// On-disk scenario layout
#[derive(Debug, Clone, Deserialize)]
struct ScenarioDocument {
    scenario_metadata: ScenarioMetadata,
    #[serde(default)]
    evidence: EvidenceSection,
    #[serde(default)]
    solution: Option<Solution>,
    #[serde(default)]
    required_investigation_areas: Vec<String>,
    /// Seconds
    #[serde(default)]
    estimated_duration: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ScenarioMetadata {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    estimated_duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EvidenceSection {
    #[serde(default)]
    items: Vec<EvidenceItem>,
}

impl TryFrom<ScenarioDocument> for Scenario {
    type Error = GameError;

    fn try_from(doc: ScenarioDocument) -> Result<Self, Self::Error> {
        let meta = doc.scenario_metadata;
        if meta.id.trim().is_empty() {
            return Err(GameError::InvalidScenario("scenario id is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for item in &doc.evidence.items {
            if !seen.insert(item.id.as_str()) {
                return Err(GameError::InvalidScenario(format!(
                    "duplicate evidence id '{}' in scenario '{}'",
                    item.id, meta.id
                )));
            }
        }

        let difficulty_label = meta.difficulty.unwrap_or_else(|| "intermediate".to_string());

        Ok(Scenario {
            id: meta.id,
            name: meta.name,
            description: meta.description,
            difficulty: Difficulty::from_label(&difficulty_label),
            difficulty_label,
            duration_label: meta.estimated_duration,
            estimated_duration_secs: doc
                .estimated_duration
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_ESTIMATED_DURATION_SECS),
            evidence: doc.evidence.items,
            solution: doc.solution,
            required_investigation_areas: doc.required_investigation_areas,
        })
    }
}

/// Scenarios available to play
#[derive(Debug, Clone, Default)]
pub struct ScenarioLibrary {
    scenarios: Vec<Scenario>,
}

impl ScenarioLibrary {
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        let mut library = Self { scenarios };
        library.scenarios.sort_by(|a, b| a.name.cmp(&b.name));
        library
    }

    /// Load every `*.yaml` file in a directory. Files that fail to parse
    /// are skipped with a warning.
    pub fn load_dir(dir: &Path) -> crate::Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read scenario directory {}", dir.display()))?;

        let mut scenarios = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            match Scenario::load(&path) {
                Ok(scenario) => {
                    debug!(id = %scenario.id, path = %path.display(), "Loaded scenario");
                    scenarios.push(scenario);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable scenario");
                }
            }
        }

        Ok(Self::new(scenarios))
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// All scenarios, sorted by name
    pub fn list(&self) -> &[Scenario] {
        &self.scenarios
    }
}

/// The built-in tutorial scenario
pub fn phishing_scenario() -> Scenario {
    let evidence = vec![
        EvidenceItem::new("phishing_email", EvidenceType::Email, Importance::Critical)
            .with_source("Mail gateway")
            .with_content(
                "From: billing@vend0r-invoices.com\nTo: jsmith@nexus.example\n\
                 Subject: Overdue invoice #4471\nAttachment: invoice_4471.xlsm",
            )
            .with_description("Invoice email with a macro-enabled attachment sent to Finance"),
        EvidenceItem::new("powershell_execution", EvidenceType::Process, Importance::High)
            .with_source("EDR telemetry, WS-JSMITH")
            .with_content(
                "EXCEL.EXE spawned powershell.exe -nop -w hidden -enc SQBFAFgAIAAoAE4AZQB3AC0A...",
            )
            .with_description("Encoded PowerShell launched by Excel"),
        EvidenceItem::new("scheduled_task", EvidenceType::Registry, Importance::High)
            .with_source("Registry, WS-JSMITH")
            .with_content("HKLM\\SOFTWARE\\Microsoft\\Windows NT\\CurrentVersion\\Schedule\\TaskCache\\Tree\\OneDriveSync")
            .with_description("Scheduled task created for persistence"),
        EvidenceItem::new("lsass_access", EvidenceType::SecurityAlert, Importance::Critical)
            .with_source("EDR alert")
            .with_content("Suspicious handle to lsass.exe opened by rundll32.exe (PROCESS_VM_READ)")
            .with_description("Credential dumping attempt against LSASS"),
        EvidenceItem::new("rdp_logons", EvidenceType::SecurityLog, Importance::Medium)
            .with_source("Domain controller security log")
            .with_content("4624 logon type 10 for jsmith on SRV-FS01 from 10.0.5.42")
            .with_description("RDP logons using the Finance analyst's account"),
        EvidenceItem::new("outbound_transfer", EvidenceType::NetworkLog, Importance::High)
            .with_source("Firewall")
            .with_content("10.1.0.20 -> 185.220.101.7:443 bytes_out=2.3GB")
            .with_description("Large HTTPS upload from the file server"),
        EvidenceItem::new("cafeteria_wifi", EvidenceType::WebLog, Importance::Low)
            .with_source("Guest proxy")
            .with_content("Spike in streaming traffic on the guest network at lunch")
            .with_description("Unrelated guest network traffic"),
    ];

    Scenario {
        id: "phishing_01".to_string(),
        name: "The Monday Morning Malware".to_string(),
        description: "An EDR alert flags suspicious PowerShell on a Finance workstation. \
                      The user says he only opened an invoice from a vendor."
            .to_string(),
        difficulty: Difficulty::Beginner,
        difficulty_label: "beginner".to_string(),
        duration_label: Some("30-45 minutes".to_string()),
        estimated_duration_secs: 45 * 60,
        evidence,
        solution: Some(Solution {
            attack_type: "phishing".to_string(),
            attack_vector: "malicious attachment".to_string(),
            key_indicators: vec![
                "invoice_4471.xlsm".to_string(),
                "powershell".to_string(),
                "scheduled task".to_string(),
                "lsass".to_string(),
            ],
        }),
        required_investigation_areas: Vec::new(),
    }
}
