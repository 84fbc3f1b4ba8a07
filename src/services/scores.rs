use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::PgConnection;

use crate::db::models::{score_types, CalculatedScore, NewCalculatedScore};
use crate::errors::PipelineError;
use crate::schema;
use crate::services::scoring::ScoreResult;

/// Atomic insert-or-replace keyed by (employee_id, score_date, score_type):
/// overwrites every derived field and bumps updated_at when the row exists.
pub fn upsert_daily(
    conn: &mut PgConnection,
    employee_id: i64,
    organization_id: i64,
    date: NaiveDate,
    score: &ScoreResult,
) -> Result<CalculatedScore, PipelineError> {
    use schema::calculated_scores::dsl as S;

    let new_row = NewCalculatedScore {
        employee_id,
        organization_id,
        score_date: date,
        score_type: score_types::DAILY.to_string(),
        working_total: score.totals.working_total,
        distracted_total: score.totals.distracted_total,
        idle_total: score.totals.idle_total,
        grand_total: score.totals.grand_total,
        productivity_score: score.productivity_score,
        engagement_score: score.engagement_score,
        overall_score: score.overall_score,
        performance_grade: score.performance_grade.to_string(),
        interval_count: score.totals.interval_count,
    };

    diesel::insert_into(S::calculated_scores)
        .values(&new_row)
        .on_conflict((S::employee_id, S::score_date, S::score_type))
        .do_update()
        .set((
            S::organization_id.eq(new_row.organization_id),
            S::working_total.eq(new_row.working_total),
            S::distracted_total.eq(new_row.distracted_total),
            S::idle_total.eq(new_row.idle_total),
            S::grand_total.eq(new_row.grand_total),
            S::productivity_score.eq(new_row.productivity_score),
            S::engagement_score.eq(new_row.engagement_score),
            S::overall_score.eq(new_row.overall_score),
            S::performance_grade.eq(new_row.performance_grade.clone()),
            S::interval_count.eq(new_row.interval_count),
            S::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
        .map_err(|e| PipelineError::internal(format!("upsert daily score failed: {}", e)))?;

    get_by_employee_and_date(conn, employee_id, date)?
        .ok_or_else(|| PipelineError::internal("daily score missing immediately after upsert"))
}

pub fn get_by_employee_and_date(
    conn: &mut PgConnection,
    employee_id: i64,
    date: NaiveDate,
) -> Result<Option<CalculatedScore>, PipelineError> {
    use schema::calculated_scores::dsl as S;

    S::calculated_scores
        .filter(
            S::employee_id
                .eq(employee_id)
                .and(S::score_date.eq(date))
                .and(S::score_type.eq(score_types::DAILY)),
        )
        .first(conn)
        .optional()
        .map_err(|e| PipelineError::internal(format!("fetch daily score failed: {}", e)))
}

/// Scores within [start, end], newest first, capped by limit.
pub fn get_by_employee_date_range(
    conn: &mut PgConnection,
    employee_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    limit: i64,
) -> Result<Vec<CalculatedScore>, PipelineError> {
    use schema::calculated_scores::dsl as S;

    S::calculated_scores
        .filter(
            S::employee_id
                .eq(employee_id)
                .and(S::score_type.eq(score_types::DAILY))
                .and(S::score_date.ge(start))
                .and(S::score_date.le(end)),
        )
        .order(S::score_date.desc())
        .limit(limit)
        .load(conn)
        .map_err(|e| PipelineError::internal(format!("fetch score range failed: {}", e)))
}

/// Ascending time series for the last `days` calendar days, today inclusive.
pub fn get_trends(
    conn: &mut PgConnection,
    employee_id: i64,
    days: i64,
) -> Result<Vec<CalculatedScore>, PipelineError> {
    use schema::calculated_scores::dsl as S;

    let today = Utc::now().date_naive();
    let from = today - chrono::Duration::days(days - 1);
    S::calculated_scores
        .filter(
            S::employee_id
                .eq(employee_id)
                .and(S::score_type.eq(score_types::DAILY))
                .and(S::score_date.ge(from))
                .and(S::score_date.le(today)),
        )
        .order(S::score_date.asc())
        .load(conn)
        .map_err(|e| PipelineError::internal(format!("fetch score trends failed: {}", e)))
}

/// Retention sweep companion to the interval purge; scores and raw intervals
/// share the same retention policy.
pub fn delete_older_than(conn: &mut PgConnection, cutoff: NaiveDate) -> Result<usize, PipelineError> {
    use schema::calculated_scores::dsl as S;

    diesel::delete(S::calculated_scores.filter(S::score_date.lt(cutoff)))
        .execute(conn)
        .map_err(|e| PipelineError::internal(format!("score retention sweep failed: {}", e)))
}
