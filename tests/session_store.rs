//! Session store persistence and retention

use chrono::{Duration, Utc};
use incidenter::game::SessionStore;
use incidenter::scoring::{Scorer, SessionData};
use incidenter::{
    game::scenario::phishing_scenario, DiscoveredEvidence, EvidenceItem, EvidenceType, Importance,
    InvestigationAction, SessionState, Theory, TheoryAspect, TheoryComponents,
};
use proptest::prelude::*;
use std::collections::HashSet;
use tempfile::TempDir;

fn populated_state() -> SessionState {
    let mut state = SessionState::new("phishing_01", "The Monday Morning Malware", "Ana", "Initial Access");
    state.ledger.record_action(InvestigationAction {
        timestamp: state.start_time + Duration::milliseconds(1500),
        action: "examine_logs".to_string(),
        details: "check the mail gateway for the invoice email".to_string(),
        response: Some("Discovered: phishing email".to_string()),
        phase: "Initial Access".to_string(),
    });
    state.ledger.record_evidence(DiscoveredEvidence::new(
        EvidenceItem::new("phishing_email", EvidenceType::Email, Importance::Critical)
            .with_source("Mail gateway")
            .with_description("Invoice email"),
        state.start_time + Duration::nanoseconds(123_456_789),
    ));
    let theory = TheoryComponents::default()
        .with(TheoryAspect::InitialAccess, "phishing email")
        .with(TheoryAspect::Impact, "credential theft");
    state.ledger.record_theory(Theory::new(theory, "Initial Access", state.ledger.context()));
    state.hints_used = 2;
    state.session_notes = "finance laptop first".to_string();
    state
        .metadata
        .insert("team".to_string(), serde_json::json!({"size": 3, "names": ["a", "b"]}));
    state
}

#[test]
fn test_save_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::open(dir.path(), 10).unwrap();

    let mut state = populated_state();
    let data = SessionData::from_session(&state, &phishing_scenario(), state.start_time + Duration::minutes(31));
    state.final_score = Some(Scorer::new().score_game_session(&phishing_scenario(), &data));
    state.is_completed = true;
    state.completion_time = Some(state.start_time + Duration::minutes(31));

    store.save(&state).unwrap();
    let loaded = store.load(state.session_id.as_str()).unwrap();
    assert_eq!(loaded, state);
    assert_eq!(loaded.ledger.evidence[0].discovered_at, state.ledger.evidence[0].discovered_at);

    // Repeated loads agree
    assert_eq!(store.load(state.session_id.as_str()).unwrap(), loaded);
}

#[test]
fn test_record_layout_uses_iso_timestamps() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::open(dir.path(), 10).unwrap();
    let state = populated_state();
    store.save(&state).unwrap();

    let raw = std::fs::read_to_string(dir.path().join(format!("{}.json", state.session_id))).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let start = value["start_time"].as_str().unwrap();
    assert_eq!(start.parse::<chrono::DateTime<Utc>>().unwrap(), state.start_time);
    assert_eq!(value["evidence_discovered"][0]["id"], "phishing_email");
    assert_eq!(value["hints_used"], 2);
}

#[test]
fn test_retention_keeps_newest() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::open(dir.path(), 10).unwrap();

    let mut created = Vec::new();
    for i in 0..15 {
        let state = store.create("S1", &format!("Run {i}"), "Ana", "Initial Access").unwrap();
        created.push(state.session_id.to_string());
        std::thread::sleep(std::time::Duration::from_millis(20));
    }

    let kept: HashSet<String> = store
        .list(true)
        .into_iter()
        .map(|s| s.session_id.to_string())
        .collect();
    let newest: HashSet<String> = created[5..].iter().cloned().collect();
    assert_eq!(kept, newest);
    for old in &created[..5] {
        assert!(store.load(old).is_none());
    }
}

#[test]
fn test_listing_skips_garbage_and_orders_by_start() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::open(dir.path(), 10).unwrap();

    let mut early = populated_state();
    early.start_time = Utc::now() - Duration::hours(3);
    let late = SessionState::new("S1", "Later", "Ben", "Initial Access");
    store.save(&late).unwrap();
    store.save(&early).unwrap();
    std::fs::write(dir.path().join("deadbeef.json"), "[1, 2").unwrap();

    let listing = store.list(true);
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].session_id, late.session_id);
    assert_eq!(listing[1].actions_count, 1);
    assert_eq!(listing[1].evidence_count, 1);
    assert_eq!(listing[1].theories_count, 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_retention_bound_holds(max in 1usize..5, creates in 0usize..9) {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::open(dir.path(), max).unwrap();
        for _ in 0..creates {
            store.create("S1", "One", "Ana", "Initial Access").unwrap();
            prop_assert!(store.list(true).len() <= max);
        }
        prop_assert_eq!(store.list(true).len(), creates.min(max));
        prop_assert_eq!(store.cleanup_sessions(max), 0);
    }
}
