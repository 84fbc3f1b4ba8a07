//! The ingestion pipeline: one inbound telemetry window in, one fully
//! recomputed daily score out.
//!
//! Chain per request: validate -> store raw interval -> re-aggregate the full
//! day -> score -> upsert -> derive insights. The aggregate-then-upsert
//! sequence runs inside a single transaction holding a Postgres advisory lock
//! keyed on (employee, day), so two concurrent submissions for the same
//! employee-day serialize and the last committer always scored the complete
//! interval set it could see. A failure after the interval insert leaves the
//! score stale until the next ingestion recomputes the day.

use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel::PgConnection;
use log::{debug, info};

use crate::db::models::NewActivityInterval;
use crate::errors::PipelineError;
use crate::models::telemetry::{IngestRequest, IngestResponse};
use crate::services::scoring::ScoringEngine;
use crate::services::{aggregate, insights, intervals, scores, validate};
use crate::utils::advisory_lock_key;

pub fn ingest_interval(
    conn: &mut PgConnection,
    engine: &ScoringEngine,
    employee_id: i64,
    organization_id: i64,
    window_secs: i32,
    request: &IngestRequest,
) -> Result<IngestResponse, PipelineError> {
    // Explicit duplicate answer before any further work; the unique
    // constraint still backstops the race between this check and the insert.
    if intervals::exists(conn, employee_id, request.interval_start)? {
        return Err(PipelineError::Conflict(format!(
            "interval starting at {} already ingested for employee {}",
            request.interval_start, employee_id
        )));
    }

    let mut violations = Vec::new();
    if request.interval_end <= request.interval_start {
        violations.push(format!(
            "interval_end ({}) must be after interval_start ({})",
            request.interval_end, request.interval_start
        ));
    }
    violations.extend(validate::validate_counts(&request.counts, window_secs));
    if !violations.is_empty() {
        return Err(PipelineError::Validation(violations));
    }

    let date = request.interval_start.date_naive();
    let new_row = NewActivityInterval {
        employee_id,
        organization_id,
        interval_start: request.interval_start,
        interval_end: request.interval_end,
        typing_seconds: request.counts.typing,
        writing_seconds: request.counts.writing,
        reading_seconds: request.counts.reading,
        phone_seconds: request.counts.phone,
        gesturing_seconds: request.counts.gesturing,
        looking_away_seconds: request.counts.looking_away,
        idle_seconds: request.counts.idle,
    };

    let (stored, saved, score) = conn.transaction::<_, PipelineError, _>(|conn| {
        diesel::sql_query("SELECT pg_advisory_xact_lock($1)")
            .bind::<BigInt, _>(advisory_lock_key(employee_id, date))
            .execute(conn)
            .map_err(|e| PipelineError::internal(format!("acquire employee-day lock failed: {}", e)))?;

        let stored = intervals::create(conn, &new_row)?;
        let day_intervals = intervals::list_for_employee_on_date(conn, employee_id, date)?;
        let totals = aggregate::aggregate(&day_intervals);
        debug!(
            "Ingest: employee {} day {} recomputed from {} interval(s) (grand_total={}s)",
            employee_id, date, totals.interval_count, totals.grand_total
        );

        let score = engine.compute_from_trusted_totals(&totals);
        let saved = scores::upsert_daily(conn, employee_id, organization_id, date, &score)?;
        Ok((stored, saved, score))
    })?;

    info!(
        "Ingest: employee {} window {} stored; day {} now {} interval(s), overall {:.2} ({})",
        employee_id,
        stored.interval_start,
        date,
        saved.interval_count,
        saved.overall_score,
        saved.performance_grade
    );

    let message = if saved.interval_count == 1 {
        format!("First daily score created for {}", date)
    } else {
        format!(
            "Aggregated {} intervals into the daily score for {}",
            saved.interval_count, date
        )
    };

    Ok(IngestResponse {
        interval: stored,
        score: saved,
        insights: insights::derive(&score),
        message,
    })
}
