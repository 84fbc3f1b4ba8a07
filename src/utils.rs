use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Half-open UTC window covering one calendar day: `[00:00, next day 00:00)`.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_hms_opt(0, 0, 0).expect("midnight is always valid").and_utc();
    let end = start + chrono::Duration::days(1);
    (start, end)
}

/// Round to two decimal places; every percentage the scoring engine emits
/// passes through here.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Advisory-lock key for one employee-day. Mixes the employee id and the day
/// number so distinct employee-days virtually never collide; a rare collision
/// only over-serializes, it cannot corrupt data.
pub fn advisory_lock_key(employee_id: i64, date: NaiveDate) -> i64 {
    let day = date.num_days_from_ce() as i64;
    employee_id.wrapping_mul(0x9E37_79B9_7F4A_7C15u64 as i64) ^ day
}

/// Parse a `YYYY-MM-DD` query parameter.
pub fn parse_date_param(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", raw.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn day_bounds_are_half_open_utc() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 10).unwrap();
        let (start, end) = day_bounds(date);
        assert_eq!(start.hour(), 0);
        assert_eq!(end - start, chrono::Duration::days(1));
        assert_eq!(start.date_naive(), date);
        assert_eq!(end.date_naive(), date.succ_opt().unwrap());
    }

    #[test]
    fn round2_behaves_at_boundaries() {
        assert_eq!(round2(23.076923), 23.08);
        assert_eq!(round2(9.230769), 9.23);
        assert_eq!(round2(47.771), 47.77);
        assert_eq!(round2(89.996), 90.0);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn lock_keys_differ_across_employees_and_days() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 10).unwrap();
        let next = date.succ_opt().unwrap();
        assert_ne!(advisory_lock_key(1, date), advisory_lock_key(2, date));
        assert_ne!(advisory_lock_key(1, date), advisory_lock_key(1, next));
        // Deterministic: the same employee-day always maps to the same key.
        assert_eq!(advisory_lock_key(7, date), advisory_lock_key(7, date));
    }

    #[test]
    fn parses_date_params() {
        assert_eq!(
            parse_date_param("2025-12-10").unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 10).unwrap()
        );
        assert!(parse_date_param("12/10/2025").is_err());
    }
}
