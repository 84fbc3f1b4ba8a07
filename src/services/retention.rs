use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use diesel::PgConnection;
use log::{info, warn};

use crate::errors::PipelineError;
use crate::services::{intervals, scores};
use crate::utils::day_bounds;

/// Delete raw intervals and daily scores older than the retention window.
pub fn sweep(conn: &mut PgConnection, retention_days: i64) -> Result<(usize, usize), PipelineError> {
    let cutoff_date = Utc::now().date_naive() - chrono::Duration::days(retention_days);
    let (cutoff_ts, _) = day_bounds(cutoff_date);

    let intervals_purged = intervals::delete_older_than(conn, cutoff_ts)?;
    let scores_purged = scores::delete_older_than(conn, cutoff_date)?;
    if intervals_purged > 0 || scores_purged > 0 {
        info!(
            "Retention: purged {} interval(s) and {} score(s) older than {}",
            intervals_purged, scores_purged, cutoff_date
        );
    }
    Ok((intervals_purged, scores_purged))
}

/// Steady-cadence sweep loop; runs on its own connection, never in the
/// request path. A failed sweep is logged and retried on the next tick.
pub fn run_loop(conn: &mut PgConnection, retention_days: i64, interval: Duration) -> ! {
    loop {
        let tick_start = Instant::now();

        if let Err(e) = sweep(conn, retention_days) {
            warn!("Retention: sweep failed, will retry next tick: {}", e);
        }

        // Maintain steady cadence
        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}
