//! Full-day re-aggregation of raw intervals.
//!
//! Always recomputes from the complete stored interval set rather than
//! incrementally patching a running total: intervals can arrive out of order
//! or after a partially failed ingestion, and a from-scratch sum over the
//! authoritative rows self-heals on the next ingestion. At most 144
//! ten-minute windows fit in a day, so the recompute is cheap.

use crate::db::models::ActivityInterval;

/// Per-day category totals, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyTotals {
    pub working_total: i64,
    pub distracted_total: i64,
    pub idle_total: i64,
    pub grand_total: i64,
    pub interval_count: i32,
}

/// Sum one day's intervals. Zero intervals yields all-zero totals, which the
/// scoring engine must still accept.
pub fn aggregate(intervals: &[ActivityInterval]) -> DailyTotals {
    let mut totals = DailyTotals::default();

    for interval in intervals {
        totals.working_total +=
            interval.typing_seconds as i64 + interval.writing_seconds as i64 + interval.reading_seconds as i64;
        totals.distracted_total += interval.phone_seconds as i64
            + interval.gesturing_seconds as i64
            + interval.looking_away_seconds as i64;
        totals.idle_total += interval.idle_seconds as i64;
    }

    totals.grand_total = totals.working_total + totals.distracted_total + totals.idle_total;
    totals.interval_count = intervals.len() as i32;
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn interval(offset_minutes: i64, counts: [i32; 7]) -> ActivityInterval {
        let start = Utc.with_ymd_and_hms(2025, 12, 10, 9, 0, 0).unwrap() + chrono::Duration::minutes(offset_minutes);
        ActivityInterval {
            id: offset_minutes,
            employee_id: 1,
            organization_id: 1,
            interval_start: start,
            interval_end: start + chrono::Duration::minutes(10),
            typing_seconds: counts[0],
            writing_seconds: counts[1],
            reading_seconds: counts[2],
            phone_seconds: counts[3],
            gesturing_seconds: counts[4],
            looking_away_seconds: counts[5],
            idle_seconds: counts[6],
            created_at: start,
        }
    }

    #[test]
    fn empty_day_is_all_zero() {
        let totals = aggregate(&[]);
        assert_eq!(totals, DailyTotals::default());
    }

    #[test]
    fn buckets_map_to_working_distracted_idle() {
        let totals = aggregate(&[interval(0, [100, 50, 25, 40, 30, 20, 200])]);
        assert_eq!(totals.working_total, 175);
        assert_eq!(totals.distracted_total, 90);
        assert_eq!(totals.idle_total, 200);
        assert_eq!(totals.grand_total, 465);
        assert_eq!(totals.interval_count, 1);
    }

    #[test]
    fn totals_are_elementwise_sums_across_intervals() {
        // The three-window scenario: typing-only, phone-only, idle-only.
        let intervals = vec![
            interval(0, [300, 0, 0, 0, 0, 0, 0]),
            interval(10, [0, 0, 0, 400, 0, 0, 0]),
            interval(20, [0, 0, 0, 0, 0, 0, 600]),
        ];
        let totals = aggregate(&intervals);
        assert_eq!(totals.working_total, 300);
        assert_eq!(totals.distracted_total, 400);
        assert_eq!(totals.idle_total, 600);
        assert_eq!(totals.grand_total, 1300);
        assert_eq!(totals.interval_count, 3);
    }

    #[test]
    fn grand_total_identity_holds() {
        let intervals = vec![
            interval(0, [111, 22, 3, 44, 55, 6, 77]),
            interval(10, [9, 8, 7, 6, 5, 4, 3]),
            interval(30, [0, 600, 0, 0, 0, 0, 0]),
        ];
        let totals = aggregate(&intervals);
        assert_eq!(
            totals.grand_total,
            totals.working_total + totals.distracted_total + totals.idle_total
        );
    }
}
