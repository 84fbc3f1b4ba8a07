//! Pure scoring engine: daily totals in, bounded scores and a grade out.
//!
//! Two explicit entry points instead of a validation-bypass flag:
//! `validate_and_compute` for a single live window (strict bound checks) and
//! `compute_from_trusted_totals` for full-day aggregates, which legitimately
//! exceed any per-window bound. Weights are injected at construction so the
//! engine stays a pure function of its inputs.

use crate::models::telemetry::CategoryCounts;
use crate::services::aggregate::DailyTotals;
use crate::services::validate::validate_counts;
use crate::utils::round2;

/// Working-time share above which the consistency bonus applies.
const CONSISTENCY_THRESHOLD: f64 = 0.6;

pub const DEFAULT_IDLE_PENALTY: f64 = 20.0;
pub const DEFAULT_DISTRACTED_PENALTY: f64 = 35.0;
pub const DEFAULT_CONSISTENCY_BONUS: f64 = 5.0;
pub const DEFAULT_PRODUCTIVITY_WEIGHT: f64 = 0.55;
pub const DEFAULT_ENGAGEMENT_WEIGHT: f64 = 0.45;

/// Operator-tunable scoring constants. Plain data, overridable via `SCORE_*`
/// environment variables in `Config::from_env`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Percentage points subtracted per unit of idle ratio.
    pub idle_penalty: f64,
    /// Percentage points subtracted per unit of distraction ratio.
    pub distracted_penalty: f64,
    /// Flat engagement bonus when the working ratio exceeds the threshold.
    pub consistency_bonus: f64,
    pub productivity_weight: f64,
    pub engagement_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            idle_penalty: DEFAULT_IDLE_PENALTY,
            distracted_penalty: DEFAULT_DISTRACTED_PENALTY,
            consistency_bonus: DEFAULT_CONSISTENCY_BONUS,
            productivity_weight: DEFAULT_PRODUCTIVITY_WEIGHT,
            engagement_weight: DEFAULT_ENGAGEMENT_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
    pub totals: DailyTotals,
    pub productivity_score: f64,
    pub engagement_score: f64,
    pub overall_score: f64,
    pub performance_grade: &'static str,
}

impl ScoreResult {
    pub fn working_ratio(&self) -> f64 {
        ratio(self.totals.working_total, self.totals.grand_total)
    }

    pub fn idle_ratio(&self) -> f64 {
        ratio(self.totals.idle_total, self.totals.grand_total)
    }

    pub fn distraction_ratio(&self) -> f64 {
        ratio(self.totals.distracted_total, self.totals.grand_total)
    }
}

fn ratio(part: i64, grand: i64) -> f64 {
    if grand == 0 { 0.0 } else { part as f64 / grand as f64 }
}

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        ScoringEngine { weights }
    }

    /// Strict entry point for one live window: runs the full validator before
    /// scoring the window as if it were the whole day.
    pub fn validate_and_compute(
        &self,
        counts: &CategoryCounts,
        window_secs: i32,
    ) -> Result<ScoreResult, Vec<String>> {
        let violations = validate_counts(counts, window_secs);
        if !violations.is_empty() {
            return Err(violations);
        }

        let working = (counts.typing + counts.writing + counts.reading) as i64;
        let distracted = (counts.phone + counts.gesturing + counts.looking_away) as i64;
        let idle = counts.idle as i64;
        let totals = DailyTotals {
            working_total: working,
            distracted_total: distracted,
            idle_total: idle,
            grand_total: working + distracted + idle,
            interval_count: 1,
        };
        Ok(self.compute_from_trusted_totals(&totals))
    }

    /// Trusted entry point for full-day aggregates; never fails and never
    /// reapplies the per-window bounds. Division by the grand total is
    /// guarded by the zero-activity early return.
    pub fn compute_from_trusted_totals(&self, totals: &DailyTotals) -> ScoreResult {
        if totals.grand_total == 0 {
            return ScoreResult {
                totals: *totals,
                productivity_score: 0.0,
                engagement_score: 0.0,
                overall_score: 0.0,
                performance_grade: grade_for(0.0),
            };
        }

        let grand = totals.grand_total as f64;
        let working_ratio = totals.working_total as f64 / grand;
        let idle_ratio = totals.idle_total as f64 / grand;
        let distraction_ratio = totals.distracted_total as f64 / grand;

        let productivity =
            (round2(working_ratio * 100.0) - round2(idle_ratio * self.weights.idle_penalty)).clamp(0.0, 100.0);

        let consistency = if working_ratio > CONSISTENCY_THRESHOLD {
            self.weights.consistency_bonus
        } else {
            0.0
        };
        let engagement = (100.0 - round2(distraction_ratio * self.weights.distracted_penalty) + consistency)
            .clamp(0.0, 100.0);

        // Weighted sum of two clamped values with weights summing to 1; no
        // separate clamp needed.
        let overall = round2(
            productivity * self.weights.productivity_weight + engagement * self.weights.engagement_weight,
        );

        ScoreResult {
            totals: *totals,
            productivity_score: round2(productivity),
            engagement_score: round2(engagement),
            overall_score: overall,
            performance_grade: grade_for(overall),
        }
    }
}

/// Letter grade bands, inclusive on the lower bound of each band.
fn grade_for(overall: f64) -> &'static str {
    if overall >= 90.0 {
        "A"
    } else if overall >= 80.0 {
        "B"
    } else if overall >= 70.0 {
        "C"
    } else if overall >= 60.0 {
        "D"
    } else {
        "F"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ScoringEngine {
        ScoringEngine::new(ScoringWeights::default())
    }

    fn totals(working: i64, distracted: i64, idle: i64, count: i32) -> DailyTotals {
        DailyTotals {
            working_total: working,
            distracted_total: distracted,
            idle_total: idle,
            grand_total: working + distracted + idle,
            interval_count: count,
        }
    }

    #[test]
    fn zero_activity_scores_zero_grade_f() {
        let result = engine().compute_from_trusted_totals(&DailyTotals::default());
        assert_eq!(result.productivity_score, 0.0);
        assert_eq!(result.engagement_score, 0.0);
        assert_eq!(result.overall_score, 0.0);
        assert_eq!(result.performance_grade, "F");
    }

    #[test]
    fn three_window_day_scenario() {
        // 300s typing + 400s phone + 600s idle across three windows.
        let result = engine().compute_from_trusted_totals(&totals(300, 400, 600, 3));
        assert_eq!(result.productivity_score, 13.85);
        assert_eq!(result.engagement_score, 89.23);
        assert_eq!(result.overall_score, 47.77);
        assert_eq!(result.performance_grade, "F");
    }

    #[test]
    fn fully_working_day_maxes_out() {
        let result = engine().compute_from_trusted_totals(&totals(28_800, 0, 0, 48));
        assert_eq!(result.productivity_score, 100.0);
        // 100 - 0 + consistency bonus, clamped back to 100
        assert_eq!(result.engagement_score, 100.0);
        assert_eq!(result.overall_score, 100.0);
        assert_eq!(result.performance_grade, "A");
    }

    #[test]
    fn idle_heavy_day_clamps_productivity_at_zero() {
        // working 10%, idle 90%: 10.0 - 18.0 would be negative
        let result = engine().compute_from_trusted_totals(&totals(100, 0, 900, 2));
        assert_eq!(result.productivity_score, 0.0);
        assert!(result.engagement_score >= 0.0 && result.engagement_score <= 100.0);
    }

    #[test]
    fn scores_stay_in_bounds_across_mixes() {
        for (w, d, i) in [(0, 1000, 0), (1, 1, 1), (999, 1, 0), (0, 0, 1), (500, 250, 250)] {
            let result = engine().compute_from_trusted_totals(&totals(w, d, i, 1));
            assert!((0.0..=100.0).contains(&result.productivity_score));
            assert!((0.0..=100.0).contains(&result.engagement_score));
            assert!((0.0..=100.0).contains(&result.overall_score));
        }
    }

    #[test]
    fn consistency_bonus_requires_majority_working_ratio() {
        // 59% working: no bonus
        let below = engine().compute_from_trusted_totals(&totals(59, 41, 0, 1));
        // 70% working: bonus applies
        let above = engine().compute_from_trusted_totals(&totals(70, 30, 0, 1));
        assert_eq!(below.engagement_score, round2(100.0 - round2(0.41 * 35.0)));
        assert_eq!(above.engagement_score, round2(100.0 - round2(0.30 * 35.0) + 5.0));
    }

    #[test]
    fn grade_bands_are_inclusive_on_lower_bound() {
        assert_eq!(grade_for(90.0), "A");
        assert_eq!(grade_for(89.99), "B");
        assert_eq!(grade_for(80.0), "B");
        assert_eq!(grade_for(79.99), "C");
        assert_eq!(grade_for(70.0), "C");
        assert_eq!(grade_for(69.99), "D");
        assert_eq!(grade_for(60.0), "D");
        assert_eq!(grade_for(59.99), "F");
        assert_eq!(grade_for(0.0), "F");
    }

    #[test]
    fn validate_and_compute_rejects_out_of_bound_window() {
        let counts = CategoryCounts {
            typing: 300,
            writing: 200,
            reading: 101,
            ..CategoryCounts::default()
        };
        let violations = engine().validate_and_compute(&counts, 600).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("total of all categories"));
    }

    #[test]
    fn validate_and_compute_scores_a_clean_window() {
        let counts = CategoryCounts {
            typing: 480,
            reading: 60,
            idle: 60,
            ..CategoryCounts::default()
        };
        let result = engine().validate_and_compute(&counts, 600).expect("valid window");
        assert_eq!(result.totals.working_total, 540);
        assert_eq!(result.totals.idle_total, 60);
        assert_eq!(result.totals.interval_count, 1);
        // 90% working, 10% idle: 90.00 - 2.00
        assert_eq!(result.productivity_score, 88.0);
    }

    #[test]
    fn weights_are_injected_not_global() {
        let harsh = ScoringEngine::new(ScoringWeights {
            idle_penalty: 100.0,
            ..ScoringWeights::default()
        });
        let default_result = engine().compute_from_trusted_totals(&totals(500, 0, 500, 1));
        let harsh_result = harsh.compute_from_trusted_totals(&totals(500, 0, 500, 1));
        assert!(harsh_result.productivity_score < default_result.productivity_score);
        assert_eq!(harsh_result.productivity_score, 0.0);
    }
}
