//! Structural and bound validation for live per-window telemetry batches.
//!
//! Applies only to raw classifier submissions; full-day aggregates bypass it
//! (`scoring::compute_from_trusted_totals`) because a whole day legitimately
//! exceeds any single window bound.

use crate::models::telemetry::CategoryCounts;

/// Check one window's category counts against the nominal window length.
/// Evaluates every rule and returns all violations, so a caller can report
/// every problem at once; an empty vec means valid.
pub fn validate_counts(counts: &CategoryCounts, window_secs: i32) -> Vec<String> {
    let mut violations = Vec::new();

    for (name, value) in counts.named() {
        if value < 0 {
            violations.push(format!("{} must be >= 0, got {}", name, value));
        }
        if value > window_secs {
            violations.push(format!(
                "{} must not exceed the {}-second window, got {}",
                name, window_secs, value
            ));
        }
    }

    let total = counts.total();
    if total > window_secs as i64 {
        violations.push(format!(
            "total of all categories must not exceed the {}-second window, got {}",
            window_secs, total
        ));
    }

    violations
}
