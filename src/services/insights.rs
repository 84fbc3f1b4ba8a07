//! Threshold-driven qualitative insights over a computed score.
//!
//! Deterministic text generation, no randomness, no external state; reads an
//! already-valid `ScoreResult` and cannot fail.

use crate::models::telemetry::Insights;
use crate::services::scoring::ScoreResult;

const DISTRACTION_IMPROVEMENT_THRESHOLD: f64 = 0.2;
const IDLE_IMPROVEMENT_THRESHOLD: f64 = 0.25;
const WORKING_IMPROVEMENT_THRESHOLD: f64 = 0.5;
const LOW_IDLE_STRENGTH_THRESHOLD: f64 = 0.15;

pub fn derive(score: &ScoreResult) -> Insights {
    let mut strengths = Vec::new();
    let mut improvements = Vec::new();
    let mut recommendations = Vec::new();

    let summary = summarize(score.overall_score);

    // Ratio thresholds are meaningless on an all-zero day; an empty day gets
    // the bottom summary and the generic recommendation only.
    if score.totals.grand_total > 0 {
        if score.productivity_score >= 80.0 {
            strengths.push("High share of focused working time".to_string());
        }
        if score.engagement_score >= 80.0 {
            strengths.push("Strong engagement with few distractions".to_string());
        }
        if score.idle_ratio() < LOW_IDLE_STRENGTH_THRESHOLD {
            strengths.push("Very little idle time".to_string());
        }

        if score.distraction_ratio() > DISTRACTION_IMPROVEMENT_THRESHOLD {
            improvements.push("A large share of the day went to phone, gesturing or looking away".to_string());
            recommendations
                .push("Silence notifications and batch phone use into dedicated breaks".to_string());
        }
        if score.idle_ratio() > IDLE_IMPROVEMENT_THRESHOLD {
            improvements.push("Idle time takes up over a quarter of the tracked day".to_string());
            recommendations.push("Schedule short, regular breaks instead of long unstructured gaps".to_string());
        }
        if score.working_ratio() < WORKING_IMPROVEMENT_THRESHOLD {
            improvements.push("Less than half the tracked time was spent on work activities".to_string());
            recommendations.push("Block out focus hours for typing, writing and reading tasks".to_string());
        }
    }

    if score.overall_score < 80.0 {
        recommendations.push("Review the daily trend to find the hours where focus drops off".to_string());
    }

    Insights {
        summary,
        strengths,
        improvements,
        recommendations,
    }
}

fn summarize(overall: f64) -> String {
    let assessment = if overall >= 90.0 {
        "exceptional"
    } else if overall >= 80.0 {
        "strong"
    } else if overall >= 70.0 {
        "satisfactory"
    } else if overall >= 60.0 {
        "needs attention"
    } else {
        "requires improvement"
    };
    format!("Overall performance for the day is {} ({:.2}/100)", assessment, overall)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::aggregate::DailyTotals;
    use crate::services::scoring::{ScoringEngine, ScoringWeights};

    fn score(working: i64, distracted: i64, idle: i64) -> ScoreResult {
        ScoringEngine::new(ScoringWeights::default()).compute_from_trusted_totals(&DailyTotals {
            working_total: working,
            distracted_total: distracted,
            idle_total: idle,
            grand_total: working + distracted + idle,
            interval_count: 1,
        })
    }

    #[test]
    fn summary_buckets_track_overall_score() {
        assert!(derive(&score(10_000, 0, 0)).summary.contains("exceptional"));
        assert!(derive(&score(300, 400, 600)).summary.contains("requires improvement"));
    }

    #[test]
    fn focused_day_lists_strengths_and_no_improvements() {
        // ~96% working, no distraction, 4% idle
        let insights = derive(&score(9_600, 0, 400));
        assert!(insights.strengths.iter().any(|s| s.contains("working time")));
        assert!(insights.strengths.iter().any(|s| s.contains("idle")));
        assert!(insights.improvements.is_empty());
        assert!(insights.recommendations.is_empty());
    }

    #[test]
    fn distracted_day_gets_matching_improvement_and_recommendation() {
        // 30% of the day distracted
        let insights = derive(&score(500, 300, 200));
        assert!(insights.improvements.iter().any(|s| s.contains("phone")));
        assert!(insights.recommendations.iter().any(|s| s.contains("notifications")));
    }

    #[test]
    fn low_overall_appends_generic_recommendation() {
        let insights = derive(&score(300, 400, 600));
        assert!(insights.recommendations.iter().any(|s| s.contains("daily trend")));
    }

    #[test]
    fn zero_day_skips_ratio_derived_text() {
        let insights = derive(&score(0, 0, 0));
        assert!(insights.summary.contains("requires improvement"));
        assert!(insights.strengths.is_empty());
        assert!(insights.improvements.is_empty());
        // generic recommendation still applies (overall 0 < 80)
        assert_eq!(insights.recommendations.len(), 1);
    }

    #[test]
    fn idle_and_working_thresholds_fire_together() {
        // 40% working, 15% distracted, 45% idle
        let insights = derive(&score(400, 150, 450));
        assert!(insights.improvements.iter().any(|s| s.contains("Idle time")));
        assert!(insights.improvements.iter().any(|s| s.contains("Less than half")));
        assert!(insights.recommendations.len() >= 3);
    }
}
