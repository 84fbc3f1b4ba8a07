//! Diesel model structs for the two persisted entities.
//!
//! `activity_intervals` is append-only raw telemetry; `calculated_scores`
//! holds the derived daily record, replaced in full on every ingestion for
//! that employee-day.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema;

// Standardized values for `calculated_scores.score_type`. Only daily records
// are produced by this pipeline; weekly/monthly rollups are a separate job.
pub mod score_types {
    pub const DAILY: &str = "daily";
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = schema::activity_intervals)]
pub struct ActivityInterval {
    pub id: i64,
    pub employee_id: i64,
    pub organization_id: i64,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
    pub typing_seconds: i32,
    pub writing_seconds: i32,
    pub reading_seconds: i32,
    pub phone_seconds: i32,
    pub gesturing_seconds: i32,
    pub looking_away_seconds: i32,
    pub idle_seconds: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = schema::activity_intervals)]
pub struct NewActivityInterval {
    pub employee_id: i64,
    pub organization_id: i64,
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
    pub typing_seconds: i32,
    pub writing_seconds: i32,
    pub reading_seconds: i32,
    pub phone_seconds: i32,
    pub gesturing_seconds: i32,
    pub looking_away_seconds: i32,
    pub idle_seconds: i32,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = schema::calculated_scores)]
pub struct CalculatedScore {
    pub id: i64,
    pub employee_id: i64,
    pub organization_id: i64,
    pub score_date: NaiveDate,
    pub score_type: String,
    pub working_total: i64,
    pub distracted_total: i64,
    pub idle_total: i64,
    pub grand_total: i64,
    pub productivity_score: f64,
    pub engagement_score: f64,
    pub overall_score: f64,
    pub performance_grade: String,
    pub interval_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = schema::calculated_scores)]
pub struct NewCalculatedScore {
    pub employee_id: i64,
    pub organization_id: i64,
    pub score_date: NaiveDate,
    pub score_type: String,
    pub working_total: i64,
    pub distracted_total: i64,
    pub idle_total: i64,
    pub grand_total: i64,
    pub productivity_score: f64,
    pub engagement_score: f64,
    pub overall_score: f64,
    pub performance_grade: String,
    pub interval_count: i32,
}
