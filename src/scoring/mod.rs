//! Scoring engine
//!
//! Two contracts live here: a quick rubric score for a single theory
//! submission, and the six-category score for a whole session.

pub mod report;
pub mod session;
pub mod theory;

pub use session::{evaluate_theory_accuracy, SessionData};
pub use theory::{CategoryScore, TheoryScore};

use serde::{Deserialize, Serialize};

/// Letter grade thresholds, highest first. First match wins.
pub const GRADE_THRESHOLDS: [(f64, &str); 11] = [
    (90.0, "A+"),
    (85.0, "A"),
    (80.0, "A-"),
    (75.0, "B+"),
    (70.0, "B"),
    (65.0, "B-"),
    (60.0, "C+"),
    (55.0, "C"),
    (50.0, "C-"),
    (45.0, "D+"),
    (40.0, "D"),
];

/// Convert a percentage to a letter grade
pub fn letter_grade(percentage: f64) -> &'static str {
    GRADE_THRESHOLDS
        .iter()
        .find(|(threshold, _)| percentage >= *threshold)
        .map(|(_, grade)| *grade)
        .unwrap_or("F")
}

/// Categories of a full-session score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    InvestigationTechnique,
    EvidenceAnalysis,
    TheoryAccuracy,
    TimeEfficiency,
    Completeness,
    Methodology,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 6] = [
        ScoreCategory::InvestigationTechnique,
        ScoreCategory::EvidenceAnalysis,
        ScoreCategory::TheoryAccuracy,
        ScoreCategory::TimeEfficiency,
        ScoreCategory::Completeness,
        ScoreCategory::Methodology,
    ];

    /// Share of the overall score
    pub fn weight(&self) -> f64 {
        match self {
            ScoreCategory::InvestigationTechnique => 0.25,
            ScoreCategory::EvidenceAnalysis => 0.20,
            ScoreCategory::TheoryAccuracy => 0.30,
            ScoreCategory::TimeEfficiency => 0.10,
            ScoreCategory::Completeness => 0.10,
            ScoreCategory::Methodology => 0.05,
        }
    }

    /// Lower-case words, e.g. "investigation technique"
    pub fn phrase(&self) -> &'static str {
        match self {
            ScoreCategory::InvestigationTechnique => "investigation technique",
            ScoreCategory::EvidenceAnalysis => "evidence analysis",
            ScoreCategory::TheoryAccuracy => "theory accuracy",
            ScoreCategory::TimeEfficiency => "time efficiency",
            ScoreCategory::Completeness => "completeness",
            ScoreCategory::Methodology => "methodology",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ScoreCategory::InvestigationTechnique => "Investigation Technique",
            ScoreCategory::EvidenceAnalysis => "Evidence Analysis",
            ScoreCategory::TheoryAccuracy => "Theory Accuracy",
            ScoreCategory::TimeEfficiency => "Time Efficiency",
            ScoreCategory::Completeness => "Completeness",
            ScoreCategory::Methodology => "Methodology",
        }
    }
}

/// Score for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub category: ScoreCategory,
    pub points_earned: u32,
    pub points_possible: u32,
    pub feedback: String,
    #[serde(default)]
    pub details: Vec<String>,
}

impl ScoreBreakdown {
    pub fn percentage(&self) -> f64 {
        if self.points_possible == 0 {
            return 0.0;
        }
        self.points_earned as f64 / self.points_possible as f64 * 100.0
    }
}

/// Complete scoring results for a game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameScore {
    pub total_points: u32,
    pub possible_points: u32,
    /// Rounded to one decimal place
    pub percentage: f64,
    pub grade: String,
    pub breakdowns: Vec<ScoreBreakdown>,
    pub overall_feedback: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub time_taken_secs: Option<f64>,
    pub efficiency_rating: String,
}

impl GameScore {
    pub fn breakdown(&self, category: ScoreCategory) -> Option<&ScoreBreakdown> {
        self.breakdowns.iter().find(|b| b.category == category)
    }
}

/// Scoring engine. Stateless; one instance can score any number of sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer;

impl Scorer {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(letter_grade(100.0), "A+");
        assert_eq!(letter_grade(90.0), "A+");
        assert_eq!(letter_grade(89.999), "A");
        assert_eq!(letter_grade(85.0), "A");
        assert_eq!(letter_grade(40.0), "D");
        assert_eq!(letter_grade(39.9), "F");
        assert_eq!(letter_grade(0.0), "F");
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = ScoreCategory::ALL.iter().map(|c| c.weight()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_percentage() {
        let b = ScoreBreakdown {
            category: ScoreCategory::Methodology,
            points_earned: 45,
            points_possible: 0,
            feedback: String::new(),
            details: vec![],
        };
        assert_eq!(b.percentage(), 0.0);
        let b = ScoreBreakdown { points_possible: 90, ..b };
        assert_eq!(b.percentage(), 50.0);
    }
}
