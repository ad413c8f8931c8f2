//! Plain-text performance report

use super::GameScore;
use std::fmt::Write;

impl GameScore {
    /// Render the score as a printable report
    pub fn report(&self, scenario_name: &str) -> String {
        let rule = "=".repeat(60);
        let thin = "-".repeat(40);
        let mut out = String::new();

        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "INCIDENTER PERFORMANCE REPORT");
        if !scenario_name.is_empty() {
            let _ = writeln!(out, "Scenario: {scenario_name}");
        }
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out);

        let _ = writeln!(
            out,
            "Overall Score: {}/{} ({:.1}%) - Grade: {}",
            self.total_points, self.possible_points, self.percentage, self.grade
        );
        if self.time_taken_secs.is_some() {
            let _ = writeln!(out, "Time Efficiency: {}", self.efficiency_rating);
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "CATEGORY BREAKDOWN:");
        let _ = writeln!(out, "{thin}");
        for b in &self.breakdowns {
            let _ = writeln!(
                out,
                "{}: {}/{} ({:.1}%)",
                b.category.title(),
                b.points_earned,
                b.points_possible,
                b.percentage()
            );
            let _ = writeln!(out, "  {}", b.feedback);
            for detail in &b.details {
                let _ = writeln!(out, "  • {detail}");
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "OVERALL FEEDBACK:");
        let _ = writeln!(out, "{thin}");
        let _ = writeln!(out, "{}", self.overall_feedback);
        let _ = writeln!(out);

        if !self.strengths.is_empty() {
            let _ = writeln!(out, "STRENGTHS:");
            for s in &self.strengths {
                let _ = writeln!(out, "✓ {s}");
            }
            let _ = writeln!(out);
        }

        if !self.improvements.is_empty() {
            let _ = writeln!(out, "AREAS FOR IMPROVEMENT:");
            for s in &self.improvements {
                let _ = writeln!(out, "→ {s}");
            }
            let _ = writeln!(out);
        }

        out.push_str(&rule);
        out
    }
}
