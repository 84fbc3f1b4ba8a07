use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::PgConnection;

use crate::db::models::{ActivityInterval, NewActivityInterval};
use crate::errors::PipelineError;
use crate::schema;
use crate::utils::day_bounds;

/// Insert one raw interval. The uniqueness constraint on
/// (employee_id, interval_start) is the idempotency guarantee: a retried
/// submission maps to `Conflict` instead of double-counting time.
pub fn create(conn: &mut PgConnection, row: &NewActivityInterval) -> Result<ActivityInterval, PipelineError> {
    use schema::activity_intervals::dsl as I;

    diesel::insert_into(I::activity_intervals)
        .values(row)
        .get_result(conn)
        .map_err(|e| match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => PipelineError::Conflict(format!(
                "interval starting at {} already ingested for employee {}",
                row.interval_start, row.employee_id
            )),
            other => PipelineError::internal(format!("insert interval failed: {}", other)),
        })
}

/// Fast pre-check used before validation so duplicate submissions get an
/// explicit "already ingested" answer without relying on the insert conflict.
pub fn exists(
    conn: &mut PgConnection,
    employee_id: i64,
    interval_start: DateTime<Utc>,
) -> Result<bool, PipelineError> {
    use diesel::dsl::count_star;
    use schema::activity_intervals::dsl as I;

    let matches: i64 = I::activity_intervals
        .filter(I::employee_id.eq(employee_id).and(I::interval_start.eq(interval_start)))
        .select(count_star())
        .first(conn)
        .map_err(|e| PipelineError::internal(format!("interval existence check failed: {}", e)))?;
    Ok(matches > 0)
}

/// All intervals whose start falls within the given UTC calendar day,
/// ascending by start. This is the read path the day aggregator depends on.
pub fn list_for_employee_on_date(
    conn: &mut PgConnection,
    employee_id: i64,
    date: NaiveDate,
) -> Result<Vec<ActivityInterval>, PipelineError> {
    use schema::activity_intervals::dsl as I;

    let (start, end) = day_bounds(date);
    I::activity_intervals
        .filter(
            I::employee_id
                .eq(employee_id)
                .and(I::interval_start.ge(start))
                .and(I::interval_start.lt(end)),
        )
        .order(I::interval_start.asc())
        .load(conn)
        .map_err(|e| PipelineError::internal(format!("list intervals for day failed: {}", e)))
}

pub fn latest_for_employee(
    conn: &mut PgConnection,
    employee_id: i64,
) -> Result<Option<ActivityInterval>, PipelineError> {
    use schema::activity_intervals::dsl as I;

    I::activity_intervals
        .filter(I::employee_id.eq(employee_id))
        .order(I::interval_start.desc())
        .first(conn)
        .optional()
        .map_err(|e| PipelineError::internal(format!("fetch latest interval failed: {}", e)))
}

/// Bulk insert that silently skips already-ingested windows; used by the
/// synthetic-data seeder so reseeding stays idempotent. The request path
/// never uses this, it needs the explicit Conflict from `create`.
pub fn create_many_skip_duplicates(
    conn: &mut PgConnection,
    rows: &[NewActivityInterval],
) -> Result<usize, PipelineError> {
    use schema::activity_intervals::dsl as I;

    if rows.is_empty() {
        return Ok(0);
    }

    diesel::insert_into(I::activity_intervals)
        .values(rows)
        .on_conflict((I::employee_id, I::interval_start))
        .do_nothing()
        .execute(conn)
        .map_err(|e| PipelineError::internal(format!("batch insert intervals failed: {}", e)))
}

/// Retention sweep, run out-of-band; never part of the request path.
pub fn delete_older_than(conn: &mut PgConnection, cutoff: DateTime<Utc>) -> Result<usize, PipelineError> {
    use schema::activity_intervals::dsl as I;

    diesel::delete(I::activity_intervals.filter(I::interval_start.lt(cutoff)))
        .execute(conn)
        .map_err(|e| PipelineError::internal(format!("interval retention sweep failed: {}", e)))
}
