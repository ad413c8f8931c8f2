//! Quick rubric score for a single theory submission

use super::{letter_grade, Scorer};
use crate::data::{TheoryAspect, TheoryComponents};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Core aspects a complete theory answers
const REQUIRED_ASPECTS: [TheoryAspect; 4] = [
    TheoryAspect::InitialAccess,
    TheoryAspect::TechniquesUsed,
    TheoryAspect::Timeline,
    TheoryAspect::Objective,
];

impl TheoryAspect {
    /// Rubric points available for this aspect (sums to 100)
    pub fn max_points(&self) -> u32 {
        match self {
            TheoryAspect::InitialAccess => 20,
            TheoryAspect::TechniquesUsed => 20,
            TheoryAspect::Timeline => 15,
            TheoryAspect::Objective => 15,
            TheoryAspect::Attribution => 10,
            TheoryAspect::Impact => 10,
            TheoryAspect::AdditionalIocs => 10,
        }
    }
}

/// Display row for one rubric aspect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub earned_points: u32,
    pub max_points: u32,
    pub feedback: String,
}

/// Result of scoring one theory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoryScore {
    pub total_score: u32,
    pub max_possible_score: u32,
    pub percentage: f64,
    pub grade: String,
    pub performance_level: String,
    pub component_scores: BTreeMap<TheoryAspect, u32>,
    pub category_scores: Vec<CategoryScore>,
    pub feedback: String,
    /// Fraction of the four core aspects answered
    pub completeness: f64,
    pub accuracy_assessment: String,
}

/// Points for an answer: longer answers earn a larger share
fn component_points(answer: Option<&str>, max_points: u32) -> u32 {
    let Some(answer) = answer.filter(|a| !a.trim().is_empty()) else {
        return 0;
    };
    let share = match answer.chars().count() {
        n if n > 50 => 0.9,
        n if n > 20 => 0.7,
        _ => 0.5,
    };
    (max_points as f64 * share) as u32
}

pub fn performance_level(percentage: f64) -> &'static str {
    match percentage {
        p if p >= 90.0 => "Outstanding",
        p if p >= 80.0 => "Excellent",
        p if p >= 70.0 => "Good",
        p if p >= 60.0 => "Satisfactory",
        _ => "Needs Improvement",
    }
}

fn completeness(theory: &TheoryComponents) -> f64 {
    let answered = REQUIRED_ASPECTS.iter().filter(|a| theory.is_filled(**a)).count();
    answered as f64 / REQUIRED_ASPECTS.len() as f64
}

fn plausibility(theory: &TheoryComponents) -> &'static str {
    match theory.total_len() {
        n if n > 500 => "Highly detailed analysis",
        n if n > 200 => "Good level of detail",
        _ => "Basic analysis provided",
    }
}

fn theory_feedback(scores: &[(TheoryAspect, u32)], percentage: f64) -> String {
    let overall = match percentage {
        p if p >= 85.0 => "Excellent analysis! Your theory demonstrates strong understanding of the incident.",
        p if p >= 70.0 => "Good analysis with solid reasoning. Some areas could use more detail.",
        p if p >= 55.0 => "Reasonable analysis, but several areas need more investigation.",
        _ => "Basic analysis provided. Consider gathering more evidence before forming conclusions.",
    };

    // Ties resolve to the earliest aspect in rubric order
    let mut best = match scores.first() {
        Some(first) => *first,
        None => return overall.to_string(),
    };
    let mut worst = best;
    for &(aspect, points) in &scores[1..] {
        if points > best.1 {
            best = (aspect, points);
        }
        if points < worst.1 {
            worst = (aspect, points);
        }
    }

    let mut feedback = format!(
        "{}\n\nStrongest area: {} ({} points)\n",
        overall,
        best.0.title(),
        best.1
    );
    if worst.1 < best.1 {
        feedback.push_str(&format!("Area for improvement: {}\n", worst.0.title()));
    }
    feedback
}

impl Scorer {
    /// Score a theory against the fixed component rubric
    pub fn score_theory(&self, theory: &TheoryComponents) -> TheoryScore {
        let scores: Vec<(TheoryAspect, u32)> = TheoryAspect::ALL
            .iter()
            .map(|aspect| (*aspect, component_points(theory.get(*aspect), aspect.max_points())))
            .collect();

        let total_score: u32 = scores.iter().map(|(_, points)| points).sum();
        let max_possible_score: u32 = TheoryAspect::ALL.iter().map(|a| a.max_points()).sum();
        let percentage = total_score as f64 / max_possible_score as f64 * 100.0;

        let category_scores = scores
            .iter()
            .map(|(aspect, points)| {
                let max_points = aspect.max_points();
                CategoryScore {
                    category: aspect.title().to_string(),
                    earned_points: *points,
                    max_points,
                    feedback: if *points as f64 > max_points as f64 * 0.7 {
                        "Good detail provided".to_string()
                    } else {
                        "Could use more detail".to_string()
                    },
                }
            })
            .collect();

        TheoryScore {
            total_score,
            max_possible_score,
            percentage,
            grade: letter_grade(percentage).to_string(),
            performance_level: performance_level(percentage).to_string(),
            component_scores: scores.iter().copied().collect(),
            category_scores,
            feedback: theory_feedback(&scores, percentage),
            completeness: completeness(theory),
            accuracy_assessment: plausibility(theory).to_string(),
        }
    }
}
