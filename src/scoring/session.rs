//! Six-category score for a whole investigation session

use super::{letter_grade, GameScore, ScoreBreakdown, ScoreCategory, Scorer};
use crate::data::*;
use crate::game::scenario::{Scenario, Solution};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

const SPECIFIC_WORDS: [&str; 5] = ["specific", "detailed", "exact", "particular", "precise"];
const GENERAL_WORDS: [&str; 5] = ["overview", "general", "broad", "initial", "scan"];

/// Generic elements a good theory mentions
const THEORY_ELEMENTS: [&str; 4] = ["timeline", "motivation", "impact", "technique"];

/// IR lifecycle phases and their vocabulary, checked in this order
const IR_PHASES: [(&str, &[&str]); 5] = [
    ("identification", &["identify", "detect", "alert"]),
    ("containment", &["contain", "isolate", "block"]),
    ("eradication", &["eradicate", "remove", "clean"]),
    ("recovery", &["recover", "restore", "resume"]),
    ("lessons_learned", &["lesson", "review", "improve"]),
];

/// Inputs to a full-session score
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub investigation_actions: Vec<InvestigationAction>,
    pub evidence_discovered: Vec<DiscoveredEvidence>,
    pub theories_submitted: Vec<Theory>,
    pub total_time: Option<Duration>,
    pub evidence_correlations: Vec<String>,
    pub evidence_interpretations: Vec<String>,
    pub areas_investigated: Vec<String>,
    /// Ids of critical evidence the player found
    pub critical_evidence_found: Vec<String>,
}

impl SessionData {
    /// Derive scoring inputs from a recorded session
    pub fn from_session(state: &SessionState, scenario: &Scenario, now: DateTime<Utc>) -> Self {
        let critical: HashSet<&str> = scenario.critical_evidence().map(|e| e.id.as_str()).collect();

        let mut areas: Vec<String> = Vec::new();
        for action in &state.ledger.actions {
            if !areas.contains(&action.action) {
                areas.push(action.action.clone());
            }
        }

        Self {
            investigation_actions: state.ledger.actions.clone(),
            evidence_discovered: state.ledger.evidence.clone(),
            theories_submitted: state.ledger.theories.clone(),
            total_time: Some(state.elapsed(now)),
            evidence_correlations: Vec::new(),
            evidence_interpretations: Vec::new(),
            areas_investigated: areas,
            critical_evidence_found: state
                .ledger
                .evidence
                .iter()
                .filter(|e| critical.contains(e.id()))
                .map(|e| e.id().to_string())
                .collect(),
        }
    }

    /// Elapsed time in seconds, if any was tracked
    fn elapsed_secs(&self) -> Option<f64> {
        self.total_time
            .map(|t| {
                t.num_microseconds()
                    .map_or(t.num_milliseconds() as f64 / 1e3, |us| us as f64 / 1e6)
            })
            .filter(|secs| *secs > 0.0)
    }
}

/// Score theory text against a scenario's ground truth (0..=100).
///
/// Without a solution nothing can match and the score is 0.
pub fn evaluate_theory_accuracy(theory_text: &str, solution: Option<&Solution>) -> f64 {
    let Some(solution) = solution else {
        return 0.0;
    };
    let text = theory_text.to_lowercase();
    let mentions = |needle: &str| {
        let needle = needle.trim().to_lowercase();
        !needle.is_empty() && text.contains(&needle)
    };

    let mut score = 0.0;
    if mentions(&solution.attack_type) {
        score += 30.0;
    }
    if mentions(&solution.attack_vector) {
        score += 25.0;
    }
    if !solution.key_indicators.is_empty() {
        let found = solution.key_indicators.iter().filter(|i| mentions(i)).count();
        score += found as f64 / solution.key_indicators.len() as f64 * 30.0;
    }

    let elements = THEORY_ELEMENTS.iter().filter(|e| text.contains(*e)).count();
    score += elements as f64 / THEORY_ELEMENTS.len() as f64 * 15.0;

    score.min(100.0)
}

fn specificity(action: &InvestigationAction) -> f64 {
    let text = format!("{} {}", action.action, action.details).to_lowercase();
    let specific = SPECIFIC_WORDS.iter().filter(|w| text.contains(*w)).count() as f64;
    let general = GENERAL_WORDS.iter().filter(|w| text.contains(*w)).count() as f64;
    specific - general + action.details.chars().count() as f64 / 100.0
}

/// Do later actions get more specific than earlier ones?
fn shows_logical_progression(actions: &[InvestigationAction]) -> bool {
    if actions.len() < 3 {
        return false;
    }
    let (early, later) = actions.split_at(actions.len() / 2);
    let mean = |xs: &[InvestigationAction]| xs.iter().map(specificity).sum::<f64>() / xs.len() as f64;
    mean(later) > mean(early)
}

fn approach(action: &InvestigationAction) -> Option<&'static str> {
    let label = action.action.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| label.contains(w));
    if has(&["log", "network", "forensic"]) {
        Some("technical")
    } else if has(&["interview", "question", "ask"]) {
        Some("human")
    } else if has(&["timeline", "sequence", "order"]) {
        Some("temporal")
    } else {
        None
    }
}

fn ir_phase(action: &InvestigationAction) -> Option<&'static str> {
    let text = format!("{} {}", action.action, action.details).to_lowercase();
    IR_PHASES
        .iter()
        .find(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map(|(phase, _)| *phase)
}

/// Rating for actual vs expected play time
pub fn efficiency_rating(actual_secs: Option<f64>, expected_secs: u64) -> &'static str {
    let (Some(actual), true) = (actual_secs.filter(|s| *s > 0.0), expected_secs > 0) else {
        return "Unknown";
    };
    match actual / expected_secs as f64 {
        r if r <= 0.7 => "Excellent",
        r if r <= 0.9 => "Very Good",
        r if r <= 1.1 => "Good",
        r if r <= 1.3 => "Average",
        r if r <= 1.5 => "Below Average",
        _ => "Needs Improvement",
    }
}

fn breakdown(category: ScoreCategory, points: u32, tier: &str, details: Vec<String>) -> ScoreBreakdown {
    let phrase = category.phrase();
    let mut label = phrase[..1].to_uppercase();
    label.push_str(&phrase[1..]);
    ScoreBreakdown {
        category,
        points_earned: points,
        points_possible: 100,
        feedback: format!("{} score: {}/100. {}", label, points, tier),
        details,
    }
}

fn overall_feedback(percentage: f64) -> &'static str {
    match percentage {
        p if p >= 85.0 => {
            "Excellent performance! You demonstrated strong incident response skills across all areas."
        }
        p if p >= 75.0 => {
            "Good performance with solid incident response fundamentals. Some areas for refinement identified."
        }
        p if p >= 65.0 => {
            "Satisfactory performance. Focus on the identified improvement areas to enhance your IR skills."
        }
        p if p >= 50.0 => {
            "Basic incident response skills demonstrated. Significant improvement needed in multiple areas."
        }
        _ => "Performance indicates need for additional training in incident response fundamentals.",
    }
}

/// Weighted total of the category breakdowns.
///
/// Grade and feedback tier come from the unrounded percentage; only the
/// reported figure is rounded.
fn combine(breakdowns: Vec<ScoreBreakdown>, time_taken_secs: Option<f64>, efficiency: &str) -> GameScore {
    let earned: f64 = breakdowns
        .iter()
        .map(|b| b.points_earned as f64 * b.category.weight())
        .sum();
    let possible: f64 = breakdowns
        .iter()
        .map(|b| b.points_possible as f64 * b.category.weight())
        .sum();
    let raw_percentage = if possible > 0.0 { earned / possible * 100.0 } else { 0.0 };
    let percentage = (raw_percentage * 10.0).round() / 10.0;

    let strengths = breakdowns
        .iter()
        .filter(|b| b.percentage() >= 75.0)
        .map(|b| format!("Strong {}", b.category.phrase()))
        .collect();
    let improvements = breakdowns
        .iter()
        .filter(|b| b.percentage() < 60.0)
        .map(|b| format!("Improve {}", b.category.phrase()))
        .collect();

    GameScore {
        total_points: earned as u32,
        possible_points: possible as u32,
        percentage,
        grade: letter_grade(raw_percentage).to_string(),
        breakdowns,
        overall_feedback: overall_feedback(raw_percentage).to_string(),
        strengths,
        improvements,
        time_taken_secs,
        efficiency_rating: efficiency.to_string(),
    }
}

impl Scorer {
    /// Score a complete investigation session
    pub fn score_game_session(&self, scenario: &Scenario, data: &SessionData) -> GameScore {
        let breakdowns = vec![
            self.score_investigation_technique(data),
            self.score_evidence_analysis(scenario, data),
            self.score_theory_accuracy(scenario, data),
            self.score_time_efficiency(scenario, data),
            self.score_completeness(scenario, data),
            self.score_methodology(data),
        ];
        let time_taken_secs = data.elapsed_secs();
        let efficiency = efficiency_rating(time_taken_secs, scenario.estimated_duration_secs);
        combine(breakdowns, time_taken_secs, efficiency)
    }

    fn score_investigation_technique(&self, data: &SessionData) -> ScoreBreakdown {
        let actions = &data.investigation_actions;
        let mut points = 0;
        let mut details = Vec::new();

        if actions.len() >= 5 {
            points += 20;
            details.push("Conducted thorough investigation with multiple actions".to_string());
        } else if actions.len() >= 3 {
            points += 15;
            details.push("Performed adequate number of investigation actions".to_string());
        } else {
            details.push("Limited investigation actions taken".to_string());
        }

        let approaches: HashSet<&str> = actions.iter().filter_map(approach).collect();
        let diversity = (approaches.len() as u32 * 15).min(30);
        if diversity > 0 {
            points += diversity;
            details.push(format!("Used {} different investigation approaches", approaches.len()));
        }

        if shows_logical_progression(actions) {
            points += 25;
            details.push("Demonstrated logical investigation progression".to_string());
        } else {
            details.push("Investigation could benefit from more systematic approach".to_string());
        }

        let evidence_based = actions
            .iter()
            .filter(|a| {
                let details = a.details.to_lowercase();
                details.contains("evidence") || details.contains("based on")
            })
            .count();
        match evidence_based {
            0 => details.push("Could improve by making more evidence-based decisions".to_string()),
            1 => {
                points += 15;
                details.push("Some evidence-based decision making observed".to_string());
            }
            _ => {
                points += 25;
                details.push("Made evidence-based investigation decisions".to_string());
            }
        }

        let tier = match points {
            p if p >= 70 => "Strong systematic approach demonstrated.",
            p if p >= 50 => "Good investigation skills with room for improvement.",
            _ => "Consider developing more systematic investigation methodology.",
        };
        breakdown(ScoreCategory::InvestigationTechnique, points, tier, details)
    }

    fn score_evidence_analysis(&self, scenario: &Scenario, data: &SessionData) -> ScoreBreakdown {
        let mut points = 0;
        let mut details = Vec::new();

        let total = scenario.evidence.len();
        let discovered = data.evidence_discovered.len();
        if total > 0 {
            points += (discovered as f64 / total as f64 * 40.0) as u32;
            details.push(format!("Discovered {}/{} pieces of evidence", discovered, total));
        }

        let correlations = data.evidence_correlations.len();
        if correlations > 0 {
            points += (correlations as u32 * 15).min(30);
            details.push(format!("Successfully correlated {} pieces of evidence", correlations));
        }

        let interpretations = data.evidence_interpretations.len();
        if interpretations > 0 {
            points += (interpretations as u32 * 10).min(30);
            details.push(format!("Provided {} evidence interpretations", interpretations));
        }

        let tier = match points {
            p if p >= 70 => "Excellent evidence discovery and analysis.",
            p if p >= 50 => "Good evidence handling with room for deeper analysis.",
            _ => "Focus on discovering and analyzing more evidence systematically.",
        };
        breakdown(ScoreCategory::EvidenceAnalysis, points, tier, details)
    }

    fn score_theory_accuracy(&self, scenario: &Scenario, data: &SessionData) -> ScoreBreakdown {
        if data.theories_submitted.is_empty() {
            return ScoreBreakdown {
                category: ScoreCategory::TheoryAccuracy,
                points_earned: 0,
                points_possible: 100,
                feedback: "No theories submitted for evaluation.".to_string(),
                details: vec!["No theories submitted".to_string()],
            };
        }

        let solution = scenario.solution.as_ref();
        let mut details = Vec::new();
        let scores: Vec<f64> = data
            .theories_submitted
            .iter()
            .map(|theory| {
                let score = evaluate_theory_accuracy(&theory.theory.full_text(), solution);
                details.push(format!("Theory accuracy: {:.1}%", score));
                score
            })
            .collect();

        let best = scores.iter().copied().fold(0.0, f64::max);
        let mut points = best as u32;
        if scores.iter().filter(|s| **s >= 60.0).count() > 1 {
            points += 10;
            details.push("Bonus: Multiple viable theories developed".to_string());
        }
        let points = points.min(100);

        let tier = match points {
            p if p >= 80 => "Excellent understanding of the incident.",
            p if p >= 60 => "Good grasp of the incident with minor gaps.",
            _ => "Theory needs refinement - consider reviewing evidence more carefully.",
        };
        breakdown(ScoreCategory::TheoryAccuracy, points, tier, details)
    }

    fn score_time_efficiency(&self, scenario: &Scenario, data: &SessionData) -> ScoreBreakdown {
        let expected = scenario.estimated_duration_secs;
        let (points, detail) = match data.elapsed_secs() {
            Some(actual) if expected > 0 => match actual / expected as f64 {
                r if r <= 0.8 => (100, "Completed significantly faster than expected"),
                r if r <= 1.0 => (85, "Completed within expected timeframe"),
                r if r <= 1.2 => (70, "Took slightly longer than expected"),
                r if r <= 1.5 => (50, "Took moderately longer than expected"),
                _ => (25, "Took significantly longer than expected"),
            },
            _ => (50, "Time tracking not available"),
        };

        let tier = match points {
            p if p >= 85 => "Excellent time management.",
            p if p >= 70 => "Good time management.",
            _ => "Consider more efficient investigation strategies.",
        };
        breakdown(ScoreCategory::TimeEfficiency, points, tier, vec![detail.to_string()])
    }

    fn score_completeness(&self, scenario: &Scenario, data: &SessionData) -> ScoreBreakdown {
        let mut points = 0;
        let mut details = Vec::new();

        let required = &scenario.required_investigation_areas;
        if !required.is_empty() {
            let wanted: HashSet<&str> = required.iter().map(String::as_str).collect();
            let covered = data
                .areas_investigated
                .iter()
                .map(String::as_str)
                .collect::<HashSet<_>>()
                .intersection(&wanted)
                .count();
            points += (covered as f64 / required.len() as f64 * 60.0) as u32;
            details.push(format!("Covered {}/{} required areas", covered, required.len()));
        } else {
            let actions = data.investigation_actions.len();
            points += match actions {
                n if n >= 8 => 60,
                n if n >= 5 => 40,
                n if n >= 3 => 25,
                _ => 0,
            };
            details.push(format!("Performed {} investigation actions", actions));
        }

        let critical_total = scenario.critical_evidence().count();
        if critical_total > 0 {
            let found = data.critical_evidence_found.len();
            points += (found as f64 / critical_total as f64 * 40.0) as u32;
            details.push(format!("Found {}/{} critical evidence items", found, critical_total));
        } else {
            points += 40;
        }

        let tier = match points {
            p if p >= 80 => "Thorough and complete investigation.",
            p if p >= 60 => "Good coverage with some areas missed.",
            _ => "Investigation needs to be more comprehensive.",
        };
        breakdown(ScoreCategory::Completeness, points, tier, details)
    }

    fn score_methodology(&self, data: &SessionData) -> ScoreBreakdown {
        let actions = &data.investigation_actions;
        let mut details = Vec::new();

        let phases: HashSet<&str> = actions.iter().filter_map(ir_phase).collect();
        let mut points = phases.len() as u32 * 20;
        details.push(format!("Covered {} IR methodology phases", phases.len()));

        let documented = actions.iter().filter(|a| a.details.chars().count() > 20).count() as f64;
        let total = actions.len() as f64;
        if documented >= total * 0.8 {
            points += 20;
            details.push("Excellent documentation of actions".to_string());
        } else if documented >= total * 0.5 {
            points += 10;
            details.push("Good documentation practices".to_string());
        }

        let tier = match points {
            p if p >= 70 => "Strong adherence to IR methodology.",
            p if p >= 50 => "Good methodology with room for improvement.",
            _ => "Consider following established IR frameworks more closely.",
        };
        breakdown(ScoreCategory::Methodology, points, tier, details)
    }
}
