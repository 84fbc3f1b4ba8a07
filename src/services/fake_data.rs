//! Synthetic telemetry seeding for demo and local development.
//!
//! Generates plausible ten-minute windows for one demo employee over the
//! recent past and pushes every day through the real aggregate -> score ->
//! upsert path, so a fresh deployment has data behind the query endpoints.
//! Seeded RNG keeps reruns deterministic; duplicate windows are skipped.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use diesel::PgConnection;
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::db::models::NewActivityInterval;
use crate::errors::PipelineError;
use crate::services::scoring::ScoringEngine;
use crate::services::{aggregate, intervals, scores};
use crate::utils::day_bounds;

const DEMO_EMPLOYEE_ID: i64 = 420_001;
const DEMO_ORGANIZATION_ID: i64 = 1_001;
const HISTORY_DAYS: i64 = 30;
const WINDOW_MINUTES: i64 = 10;
const WORKDAY_START_HOUR: i64 = 9;
const WORKDAY_HOURS: i64 = 8;

pub fn run(conn: &mut PgConnection, engine: &ScoringEngine, window_secs: i32) -> Result<(), PipelineError> {
    let today = Utc::now().date_naive();
    let first_day = today - Duration::days(HISTORY_DAYS);
    let mut rng = SmallRng::seed_from_u64(0x00C0_FFEE_D00D_5EED);

    info!(
        "Fake data: seeding employee {} with synthetic history from {} to {}",
        DEMO_EMPLOYEE_ID, first_day, today
    );

    let mut inserted_total = 0usize;
    let mut days_scored = 0usize;
    let mut day = first_day;
    while day <= today {
        if is_weekend(day.weekday()) {
            day = day.succ_opt().expect("valid successor date");
            continue;
        }

        let windows = generate_workday(day, window_secs, &mut rng);
        inserted_total += intervals::create_many_skip_duplicates(conn, &windows)?;

        let day_intervals = intervals::list_for_employee_on_date(conn, DEMO_EMPLOYEE_ID, day)?;
        let totals = aggregate::aggregate(&day_intervals);
        let score = engine.compute_from_trusted_totals(&totals);
        scores::upsert_daily(conn, DEMO_EMPLOYEE_ID, DEMO_ORGANIZATION_ID, day, &score)?;
        days_scored += 1;

        day = day.succ_opt().expect("valid successor date");
    }

    info!(
        "Fake data: complete ({} day(s) scored, {} interval(s) inserted)",
        days_scored, inserted_total
    );
    Ok(())
}

fn generate_workday(day: NaiveDate, window_secs: i32, rng: &mut SmallRng) -> Vec<NewActivityInterval> {
    let (midnight, _) = day_bounds(day);
    let first_window = midnight + Duration::hours(WORKDAY_START_HOUR);
    let windows_per_day = WORKDAY_HOURS * 60 / WINDOW_MINUTES;

    let mut rows = Vec::with_capacity(windows_per_day as usize);
    for index in 0..windows_per_day {
        let start = first_window + Duration::minutes(index * WINDOW_MINUTES);
        let day_fraction = index as f64 / windows_per_day as f64;
        rows.push(generate_window(start, day_fraction, window_secs, rng));
    }
    rows
}

fn generate_window(
    start: DateTime<Utc>,
    day_fraction: f64,
    window_secs: i32,
    rng: &mut SmallRng,
) -> NewActivityInterval {
    let focus = focus_profile(day_fraction) + rng.random_range(-0.12..=0.12);
    let focus = focus.clamp(0.05, 0.95);

    // Slack after lunch leans toward the phone; elsewhere toward idling.
    let lunch_phase = (day_fraction - 0.5).abs() < 0.12;
    let distraction: f64 = if lunch_phase {
        rng.random_range(0.15..=0.35)
    } else {
        rng.random_range(0.02..=0.15)
    };
    let distraction = distraction.min(1.0 - focus);

    let total = window_secs as f64;
    let working_secs = (total * focus) as i32;
    let distracted_secs = (total * distraction) as i32;
    let idle_secs = window_secs - working_secs - distracted_secs;

    let typing = (working_secs as f64 * rng.random_range(0.45..=0.7)) as i32;
    let writing = (working_secs as f64 * rng.random_range(0.05..=0.2)) as i32;
    let reading = working_secs - typing - writing;

    let phone = (distracted_secs as f64 * rng.random_range(0.4..=0.7)) as i32;
    let gesturing = (distracted_secs as f64 * rng.random_range(0.1..=0.25)) as i32;
    let looking_away = distracted_secs - phone - gesturing;

    NewActivityInterval {
        employee_id: DEMO_EMPLOYEE_ID,
        organization_id: DEMO_ORGANIZATION_ID,
        interval_start: start,
        interval_end: start + Duration::minutes(WINDOW_MINUTES),
        typing_seconds: typing,
        writing_seconds: writing,
        reading_seconds: reading,
        phone_seconds: phone,
        gesturing_seconds: gesturing,
        looking_away_seconds: looking_away,
        idle_seconds: idle_secs,
    }
}

/// Focused-work share over the workday: strong morning block, dip around
/// lunch, second peak in the afternoon, fade toward the end of the day.
fn focus_profile(day_fraction: f64) -> f64 {
    let morning_peak = gaussian(day_fraction, 0.22, 0.14) * 0.85;
    let afternoon_peak = gaussian(day_fraction, 0.68, 0.16) * 0.75;
    let lunch_dip = gaussian(day_fraction, 0.5, 0.07) * 0.45;
    (morning_peak + afternoon_peak - lunch_dip).clamp(0.05, 0.95)
}

fn gaussian(x: f64, center: f64, width: f64) -> f64 {
    let exponent = -((x - center) * (x - center)) / (2.0 * width * width);
    exponent.exp()
}

fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::validate::validate_counts;
    use crate::models::telemetry::CategoryCounts;

    #[test]
    fn generated_windows_always_pass_live_validation() {
        let mut rng = SmallRng::seed_from_u64(7);
        let day = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        for row in generate_workday(day, 600, &mut rng) {
            let counts = CategoryCounts {
                typing: row.typing_seconds,
                writing: row.writing_seconds,
                reading: row.reading_seconds,
                phone: row.phone_seconds,
                gesturing: row.gesturing_seconds,
                looking_away: row.looking_away_seconds,
                idle: row.idle_seconds,
            };
            assert!(validate_counts(&counts, 600).is_empty(), "window at {}", row.interval_start);
        }
    }

    #[test]
    fn workday_covers_office_hours_in_order() {
        let mut rng = SmallRng::seed_from_u64(7);
        let day = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        let rows = generate_workday(day, 600, &mut rng);
        assert_eq!(rows.len(), 48);
        assert!(rows.windows(2).all(|pair| pair[0].interval_start < pair[1].interval_start));
        assert_eq!(rows[0].interval_start.date_naive(), day);
    }
}
