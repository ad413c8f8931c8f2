//! Evidence types that players can discover and analyze

use super::Importance;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category tag of an authored evidence item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    /// Email (phishing, exfiltration, etc.)
    Email,
    WebLog,
    FileSystemLog,
    DatabaseLog,
    AuthenticationLog,
    PowershellLog,
    ProcessLog,
    SecurityLog,
    /// Alert from security tools (SIEM, EDR, etc.)
    SecurityAlert,
    Log,
    GenericLog,
    LogEntry,
    Process,
    /// Registry key or system configuration
    Registry,
    /// Memory artifact or dump
    Memory,
    NetworkLog,
    Network,
    NetworkTraffic,
    LateralMovement,
    Forensic,
    FileAnalysis,
    Malware,
    Report,
    VendorAdvisory,
    /// Threat intelligence feed or report
    Intelligence,
    /// Statement from someone who saw something
    Witness,
}

impl EvidenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceType::Email => "email",
            EvidenceType::WebLog => "web_log",
            EvidenceType::FileSystemLog => "file_system_log",
            EvidenceType::DatabaseLog => "database_log",
            EvidenceType::AuthenticationLog => "authentication_log",
            EvidenceType::PowershellLog => "powershell_log",
            EvidenceType::ProcessLog => "process_log",
            EvidenceType::SecurityLog => "security_log",
            EvidenceType::SecurityAlert => "security_alert",
            EvidenceType::Log => "log",
            EvidenceType::GenericLog => "generic_log",
            EvidenceType::LogEntry => "log_entry",
            EvidenceType::Process => "process",
            EvidenceType::Registry => "registry",
            EvidenceType::Memory => "memory",
            EvidenceType::NetworkLog => "network_log",
            EvidenceType::Network => "network",
            EvidenceType::NetworkTraffic => "network_traffic",
            EvidenceType::LateralMovement => "lateral_movement",
            EvidenceType::Forensic => "forensic",
            EvidenceType::FileAnalysis => "file_analysis",
            EvidenceType::Malware => "malware",
            EvidenceType::Report => "report",
            EvidenceType::VendorAdvisory => "vendor_advisory",
            EvidenceType::Intelligence => "intelligence",
            EvidenceType::Witness => "witness",
        }
    }
}

impl std::fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clue authored into a scenario. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: String,
    #[serde(rename = "type")]
    pub evidence_type: EvidenceType,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EvidenceItem {
    pub fn new(id: &str, evidence_type: EvidenceType, importance: Importance) -> Self {
        Self {
            id: id.to_string(),
            evidence_type,
            source: String::new(),
            content: String::new(),
            importance,
            description: None,
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Get a brief description of the evidence
    pub fn brief(&self) -> String {
        let text = self.description.as_deref().unwrap_or(&self.content);
        let cut = text.char_indices().nth(50).map(|(i, _)| i).unwrap_or(text.len());
        format!("{} {} [{}]: {}", self.importance.symbol(), self.evidence_type, self.source, &text[..cut])
    }
}

/// An evidence item a session has uncovered, with the moment it surfaced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredEvidence {
    #[serde(flatten)]
    pub item: EvidenceItem,
    pub discovered_at: DateTime<Utc>,
}

impl DiscoveredEvidence {
    pub fn new(item: EvidenceItem, discovered_at: DateTime<Utc>) -> Self {
        Self { item, discovered_at }
    }

    pub fn id(&self) -> &str {
        &self.item.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags_match_serde() {
        for t in [EvidenceType::FileSystemLog, EvidenceType::PowershellLog, EvidenceType::VendorAdvisory] {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let raw = r#"{"id": "E1", "type": "carrier_pigeon", "importance": "low"}"#;
        assert!(serde_json::from_str::<EvidenceItem>(raw).is_err());
    }

    #[test]
    fn test_discovered_evidence_flattens_item() {
        let item = EvidenceItem::new("E1", EvidenceType::Email, Importance::Critical)
            .with_source("Mail gateway");
        let found = DiscoveredEvidence::new(item, Utc::now());
        let value = serde_json::to_value(&found).unwrap();
        assert_eq!(value["id"], "E1");
        assert_eq!(value["type"], "email");
        assert!(value.get("discovered_at").is_some());
    }

    #[test]
    fn test_brief_truncates_on_char_boundary() {
        let item = EvidenceItem::new("E2", EvidenceType::Log, Importance::Low)
            .with_content(&"é".repeat(80));
        assert!(item.brief().ends_with(&"é".repeat(50)));
    }
}
