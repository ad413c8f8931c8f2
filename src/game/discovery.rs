//! Evidence discovery
//!
//! Decides whether an investigation action turns up a piece of evidence.
//! Pure over its inputs plus one injected random source; recording the
//! result is the session controller's job.

use crate::data::*;
use crate::game::scenario::Scenario;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// Probability ceiling once keywords match
pub const MAX_DISCOVERY_CHANCE: f64 = 0.95;

/// Bonus added when the player's wording matches the evidence
pub const KEYWORD_BOOST: f64 = 0.3;

/// Kinds of investigation action a player can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    ExamineLogs,
    AnalyzeNetwork,
    CheckSystem,
    AnalyzeFile,
    SearchDatabase,
    ContactVendor,
    InterviewUser,
    RunCommand,
    Other,
}

impl ActionCategory {
    pub const ALL: [ActionCategory; 9] = [
        ActionCategory::ExamineLogs,
        ActionCategory::AnalyzeNetwork,
        ActionCategory::CheckSystem,
        ActionCategory::AnalyzeFile,
        ActionCategory::SearchDatabase,
        ActionCategory::ContactVendor,
        ActionCategory::InterviewUser,
        ActionCategory::RunCommand,
        ActionCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCategory::ExamineLogs => "examine_logs",
            ActionCategory::AnalyzeNetwork => "analyze_network",
            ActionCategory::CheckSystem => "check_system",
            ActionCategory::AnalyzeFile => "analyze_file",
            ActionCategory::SearchDatabase => "search_database",
            ActionCategory::ContactVendor => "contact_vendor",
            ActionCategory::InterviewUser => "interview_user",
            ActionCategory::RunCommand => "run_command",
            ActionCategory::Other => "other",
        }
    }

    /// Evidence types this kind of action can turn up
    pub fn evidence_types(&self) -> &'static [EvidenceType] {
        use EvidenceType::*;
        match self {
            ActionCategory::ExamineLogs => &[
                WebLog,
                FileSystemLog,
                DatabaseLog,
                SecurityAlert,
                SecurityLog,
                Log,
                Process,
                Registry,
                Memory,
                Email,
            ],
            ActionCategory::AnalyzeNetwork => &[NetworkLog, Network, Forensic],
            ActionCategory::CheckSystem => &[FileSystemLog, SecurityAlert, Process, Registry, Malware, Forensic],
            ActionCategory::AnalyzeFile => &[FileSystemLog, Process, Malware, Forensic],
            ActionCategory::SearchDatabase => &[DatabaseLog, Log, Report],
            ActionCategory::ContactVendor => &[VendorAdvisory, Report, Intelligence],
            ActionCategory::InterviewUser => &[Email, Witness, Report],
            ActionCategory::RunCommand => &[FileSystemLog, SecurityAlert, Process, Registry, Forensic],
            ActionCategory::Other => &[
                WebLog,
                NetworkLog,
                SecurityAlert,
                Email,
                Process,
                Registry,
                Memory,
                Network,
                LateralMovement,
                Log,
                Report,
                Malware,
                Intelligence,
                Forensic,
            ],
        }
    }

    pub fn accepts(&self, evidence_type: EvidenceType) -> bool {
        self.evidence_types().contains(&evidence_type)
    }
}

impl std::fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| format!("unknown investigation action '{}'", s))
    }
}

/// Keyword families keyed by a fragment of the evidence type tag
const TYPE_KEYWORDS: &[(&str, &[&str])] = &[
    ("email", &["email", "phishing", "attachment", "mail", "message", "sender"]),
    ("process", &["powershell", "cmd", "process", "execution", "command", "script"]),
    ("network", &["network", "traffic", "connection", "ip", "domain", "dns"]),
    ("registry", &["registry", "hklm", "hkcu", "run", "startup", "persistence"]),
    ("memory", &["memory", "lsass", "dump", "credential", "hash"]),
    ("lateral_movement", &["smb", "admin$", "c$", "wmi", "lateral", "movement"]),
    ("log", &["log", "event", "audit", "system", "security", "application"]),
    ("report", &["report", "analysis", "summary", "findings", "investigation"]),
    ("malware", &["malware", "virus", "trojan", "backdoor", "payload", "sample"]),
    ("intelligence", &["intelligence", "ioc", "indicator", "threat", "attribution", "campaign"]),
    ("forensic", &["forensic", "analysis", "artifact", "evidence", "timeline", "investigation"]),
];

/// Keywords that make an investigation request relevant to this item
pub fn relevant_keywords(item: &EvidenceItem) -> Vec<&'static str> {
    let type_tag = item.evidence_type.as_str();
    let content = item.content.to_lowercase();
    let description = item.description.as_deref().unwrap_or_default().to_lowercase();
    let source = item.source.to_lowercase();

    let mut keywords: Vec<&'static str> = TYPE_KEYWORDS
        .iter()
        .filter(|(fragment, _)| type_tag.contains(fragment))
        .flat_map(|(_, words)| words.iter().copied())
        .collect();

    if description.contains("sql") || content.contains("sql") {
        keywords.extend(["sql", "injection", "database"]);
    }
    if description.contains("web shell") || content.contains("aspx") {
        keywords.extend(["web shell", "file", "aspx", "php"]);
    }
    if source.contains("vendor") {
        keywords.extend(["vendor", "advisory", "bulletin", "patch"]);
    }
    if description.contains("hvac") || content.contains("hvac") {
        keywords.extend(["hvac", "cooling", "heating", "vendor", "third-party"]);
    }

    keywords
}

/// Does the player's request mention anything relevant to the item?
pub fn keywords_match(details: &str, item: &EvidenceItem) -> bool {
    let details = details.to_lowercase();
    relevant_keywords(item).iter().any(|k| details.contains(k))
}

/// Probability of revealing an item on this turn
pub fn discovery_chance(item: &EvidenceItem, keywords_matched: bool) -> f64 {
    let chance = item.importance.base_discovery_chance();
    if keywords_matched {
        (chance + KEYWORD_BOOST).min(MAX_DISCOVERY_CHANCE)
    } else {
        chance
    }
}

/// First undiscovered item, in authored order, that this action can reach
pub fn next_candidate<'a>(
    category: ActionCategory,
    scenario: &'a Scenario,
    discovered: &HashSet<String>,
) -> Option<&'a EvidenceItem> {
    scenario
        .evidence
        .iter()
        .filter(|item| !discovered.contains(&item.id))
        .find(|item| category.accepts(item.evidence_type))
}

/// Roll for discovery against the next candidate only.
///
/// Candidates are ranked by authored order, not importance, and a failed
/// roll ends the turn without trying later items.
pub fn resolve<'a, R: Rng + ?Sized>(
    category: ActionCategory,
    details: &str,
    scenario: &'a Scenario,
    discovered: &HashSet<String>,
    rng: &mut R,
) -> Option<&'a EvidenceItem> {
    let candidate = next_candidate(category, scenario, discovered)?;
    let chance = discovery_chance(candidate, keywords_match(details, candidate));
    let roll: f64 = rng.gen();
    (roll < chance).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn always() -> StepRng {
        StepRng::new(0, 0)
    }

    fn never() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn scenario() -> Scenario {
        Scenario::new("S1", "Test").with_evidence(vec![
            EvidenceItem::new("E1", EvidenceType::Email, Importance::Critical),
            EvidenceItem::new("E2", EvidenceType::NetworkLog, Importance::Low),
            EvidenceItem::new("E3", EvidenceType::Process, Importance::High),
        ])
    }

    #[test]
    fn test_chance_table() {
        let mut item = EvidenceItem::new("E", EvidenceType::Log, Importance::Critical);
        assert_eq!(discovery_chance(&item, false), 0.8);
        assert_eq!(discovery_chance(&item, true), 0.95);
        item.importance = Importance::Low;
        assert_eq!(discovery_chance(&item, false), 0.2);
        assert!((discovery_chance(&item, true) - 0.5).abs() < 1e-12);
        item.importance = Importance::High;
        assert!((discovery_chance(&item, true) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_type_keywords() {
        let email = EvidenceItem::new("E1", EvidenceType::Email, Importance::Low);
        assert!(keywords_match("Check EMAIL for Phishing", &email));
        assert!(!keywords_match("look at the firewall", &email));

        // process_log picks up both the process and log families
        let proc_log = EvidenceItem::new("E2", EvidenceType::ProcessLog, Importance::Low);
        assert!(keywords_match("any powershell?", &proc_log));
        assert!(keywords_match("pull the audit trail", &proc_log));
    }

    #[test]
    fn test_content_keywords() {
        let item = EvidenceItem::new("E1", EvidenceType::WebLog, Importance::Low)
            .with_content("GET /login.php?id=1' UNION SELECT -- sql error")
            .with_source("Vendor portal");
        assert!(keywords_match("possible injection here", &item));
        assert!(keywords_match("any advisory from them", &item));
        assert!(!keywords_match("hvac", &item));
    }

    #[test]
    fn test_candidates_follow_authored_order() {
        let s = scenario();
        let none = HashSet::new();
        assert_eq!(next_candidate(ActionCategory::Other, &s, &none).unwrap().id, "E1");
        assert_eq!(next_candidate(ActionCategory::AnalyzeNetwork, &s, &none).unwrap().id, "E2");
        assert!(next_candidate(ActionCategory::ContactVendor, &s, &none).is_none());

        let found: HashSet<String> = ["E1".to_string()].into();
        assert_eq!(next_candidate(ActionCategory::Other, &s, &found).unwrap().id, "E2");
    }

    #[test]
    fn test_failed_roll_does_not_try_later_candidates() {
        let s = scenario();
        let found = resolve(ActionCategory::Other, "", &s, &HashSet::new(), &mut never());
        assert!(found.is_none());
    }

    #[test]
    fn test_forced_roll_reveals_candidate() {
        let s = scenario();
        let found = resolve(ActionCategory::CheckSystem, "", &s, &HashSet::new(), &mut always());
        assert_eq!(found.unwrap().id, "E3");
    }

    #[test]
    fn test_everything_discovered_reveals_nothing() {
        let s = scenario();
        let all: HashSet<String> = s.evidence.iter().map(|e| e.id.clone()).collect();
        let mut rng = StdRng::seed_from_u64(7);
        for category in ActionCategory::ALL {
            assert!(resolve(category, "email network process", &s, &all, &mut always()).is_none());
            assert!(resolve(category, "anything", &s, &all, &mut rng).is_none());
        }
    }

    #[test]
    fn test_action_category_parse() {
        assert_eq!("examine_logs".parse::<ActionCategory>().unwrap(), ActionCategory::ExamineLogs);
        assert!("hack_back".parse::<ActionCategory>().is_err());
    }
}
