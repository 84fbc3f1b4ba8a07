//! HTTP surface for the ingestion pipeline and the read-only query layer.
//!
//! Blocking `tiny_http` accept loop, one connection, `(method, path)` match
//! routing. The upstream identity provider terminates authentication and
//! forwards the trusted employee/organization ids as headers; requests
//! without them are rejected before any route logic runs.

use std::io::Read;

use chrono::Utc;
use diesel::PgConnection;
use log::{error, info};
use serde::Serialize;
use tiny_http::{Response, Server};

use crate::config::Config;
use crate::errors::PipelineError;
use crate::models::telemetry::{IngestRequest, LatestActivity};
use crate::services::scoring::ScoringEngine;
use crate::services::{ingest, intervals, scores};
use crate::utils::parse_date_param;

const EMPLOYEE_HEADER: &str = "X-Employee-Id";
const ORGANIZATION_HEADER: &str = "X-Organization-Id";
const MAX_BODY_BYTES: usize = 64 * 1024;

const DEFAULT_RANGE_DAYS: i64 = 30;
const DEFAULT_RANGE_LIMIT: i64 = 30;
const MAX_RANGE_LIMIT: i64 = 365;
const DEFAULT_TREND_DAYS: i64 = 7;
const MAX_TREND_DAYS: i64 = 90;

/// Caller identity as asserted by the upstream identity provider.
#[derive(Debug, Clone, Copy)]
struct Identity {
    employee_id: i64,
    organization_id: i64,
}

/// Serve until the process is killed. Requests are handled one at a time on
/// this thread; concurrent deployments behind a balancer stay correct because
/// the ingest chain takes its own per-employee-day lock in Postgres.
pub fn serve(conn: &mut PgConnection, cfg: &Config) -> Result<(), String> {
    let engine = ScoringEngine::new(cfg.scoring);
    let server = Server::http(&cfg.http_bind).map_err(|e| format!("bind {} failed: {}", cfg.http_bind, e))?;
    info!("HTTP: listening on http://{}", cfg.http_bind);

    for request in server.incoming_requests() {
        handle_request(conn, &engine, cfg.window_secs, request);
    }
    Ok(())
}

fn handle_request(conn: &mut PgConnection, engine: &ScoringEngine, window_secs: i32, mut request: tiny_http::Request) {
    let method = request.method().to_string();
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or(url.as_str()).to_string();

    let identity = match read_identity(&request) {
        Some(identity) => identity,
        None => {
            respond_json(
                request,
                401,
                serde_json::json!({ "error": "missing or malformed identity headers" }),
            );
            return;
        }
    };

    let outcome = match (method.as_str(), path.as_str()) {
        ("POST", "/activities/ingest") => {
            let body = match read_request_body(&mut request) {
                Ok(body) => body,
                Err((status, message)) => {
                    respond_json(request, status, serde_json::json!({ "error": message }));
                    return;
                }
            };
            handle_ingest(conn, engine, window_secs, identity, &body)
        }
        ("GET", "/activities/scores") => handle_score_range(conn, identity, &url),
        ("GET", "/activities/daily-scores") => handle_daily_score(conn, identity),
        ("GET", "/activities/trends") => handle_trends(conn, identity, &url),
        ("GET", "/activities/latest") => handle_latest(conn, identity),
        _ => {
            respond_json(request, 404, serde_json::json!({ "error": "not found" }));
            return;
        }
    };

    match outcome {
        Ok((status, body)) => respond_json(request, status, body),
        Err(e) => respond_pipeline_error(request, &e),
    }
}

type RouteResult = Result<(u16, serde_json::Value), PipelineError>;

fn handle_ingest(
    conn: &mut PgConnection,
    engine: &ScoringEngine,
    window_secs: i32,
    identity: Identity,
    body: &str,
) -> RouteResult {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    let request: IngestRequest = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        PipelineError::Validation(vec![format!("invalid request body at '{}': {}", e.path(), e.inner())])
    })?;

    let response = ingest::ingest_interval(
        conn,
        engine,
        identity.employee_id,
        identity.organization_id,
        window_secs,
        &request,
    )?;
    Ok((201, to_json(&response)?))
}

fn handle_score_range(conn: &mut PgConnection, identity: Identity, url: &str) -> RouteResult {
    let end = match query_param(url, "end_date") {
        Some(raw) => parse_date_param(raw).map_err(|e| PipelineError::Validation(vec![e]))?,
        None => Utc::now().date_naive(),
    };
    let start = match query_param(url, "start_date") {
        Some(raw) => parse_date_param(raw).map_err(|e| PipelineError::Validation(vec![e]))?,
        None => end - chrono::Duration::days(DEFAULT_RANGE_DAYS - 1),
    };
    if start > end {
        return Err(PipelineError::Validation(vec![format!(
            "start_date {} is after end_date {}",
            start, end
        )]));
    }
    let limit = parse_bounded_param(url, "limit", DEFAULT_RANGE_LIMIT, MAX_RANGE_LIMIT)?;

    let rows = scores::get_by_employee_date_range(conn, identity.employee_id, start, end, limit)?;
    Ok((200, to_json(&rows)?))
}

fn handle_daily_score(conn: &mut PgConnection, identity: Identity) -> RouteResult {
    let today = Utc::now().date_naive();
    let row = scores::get_by_employee_and_date(conn, identity.employee_id, today)?
        .ok_or_else(|| PipelineError::NotFound(format!("no score recorded for {} yet", today)))?;
    Ok((200, to_json(&row)?))
}

fn handle_trends(conn: &mut PgConnection, identity: Identity, url: &str) -> RouteResult {
    let days = parse_bounded_param(url, "days", DEFAULT_TREND_DAYS, MAX_TREND_DAYS)?;
    let rows = scores::get_trends(conn, identity.employee_id, days)?;
    Ok((200, to_json(&rows)?))
}

fn handle_latest(conn: &mut PgConnection, identity: Identity) -> RouteResult {
    let interval = intervals::latest_for_employee(conn, identity.employee_id)?
        .ok_or_else(|| PipelineError::NotFound("no activity recorded for this employee".to_string()))?;
    let score = scores::get_by_employee_and_date(conn, identity.employee_id, interval.interval_start.date_naive())?;
    Ok((200, to_json(&LatestActivity { interval, score })?))
}

fn read_identity(request: &tiny_http::Request) -> Option<Identity> {
    let employee_id = header_i64(request, EMPLOYEE_HEADER)?;
    let organization_id = header_i64(request, ORGANIZATION_HEADER)?;
    Some(Identity {
        employee_id,
        organization_id,
    })
}

fn header_i64(request: &tiny_http::Request, name: &'static str) -> Option<i64> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .and_then(|h| h.value.as_str().trim().parse::<i64>().ok())
}

fn read_request_body(request: &mut tiny_http::Request) -> Result<String, (u16, &'static str)> {
    let mut body = String::new();
    let mut reader = request.as_reader().take((MAX_BODY_BYTES + 1) as u64);
    if reader.read_to_string(&mut body).is_err() {
        return Err((400, "unreadable request body"));
    }
    if body.len() > MAX_BODY_BYTES {
        return Err((413, "request body too large"));
    }
    Ok(body)
}

fn query_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    let query = url.splitn(2, '?').nth(1)?;
    query.split('&').find_map(|pair| {
        let mut kv = pair.splitn(2, '=');
        if kv.next()? == name {
            Some(kv.next().unwrap_or(""))
        } else {
            None
        }
    })
}

/// Positive integer query parameter with a default and an upper cap.
fn parse_bounded_param(url: &str, name: &str, default: i64, max: i64) -> Result<i64, PipelineError> {
    match query_param(url, name) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(value) if value >= 1 => Ok(value.min(max)),
            _ => Err(PipelineError::Validation(vec![format!(
                "{} must be a positive integer, got '{}'",
                name, raw
            )])),
        },
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, PipelineError> {
    serde_json::to_value(value).map_err(|e| PipelineError::internal(format!("serialize response failed: {}", e)))
}

fn respond_pipeline_error(request: tiny_http::Request, err: &PipelineError) {
    let body = match err {
        PipelineError::Validation(violations) => {
            serde_json::json!({ "error": "validation failed", "violations": violations })
        }
        PipelineError::Conflict(message) | PipelineError::NotFound(message) => {
            serde_json::json!({ "error": message })
        }
        PipelineError::Internal(detail) => {
            error!("HTTP: request failed: {}", detail);
            serde_json::json!({ "error": "internal server error" })
        }
    };
    respond_json(request, err.status_code(), body);
}

fn respond_json(request: tiny_http::Request, status_code: u16, value: serde_json::Value) {
    let body = serde_json::to_string(&value).unwrap_or_else(|_| "{\"error\":\"serialize\"}".to_string());
    let response = Response::from_string(body)
        .with_status_code(status_code)
        .with_header(json_content_type());
    let _ = request.respond(response);
}

fn json_content_type() -> tiny_http::Header {
    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).expect("static header is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_are_extracted_by_name() {
        let url = "/activities/scores?start_date=2025-12-01&end_date=2025-12-10&limit=5";
        assert_eq!(query_param(url, "start_date"), Some("2025-12-01"));
        assert_eq!(query_param(url, "end_date"), Some("2025-12-10"));
        assert_eq!(query_param(url, "limit"), Some("5"));
        assert_eq!(query_param(url, "days"), None);
        assert_eq!(query_param("/activities/scores", "limit"), None);
    }

    #[test]
    fn bounded_params_default_cap_and_reject() {
        assert_eq!(parse_bounded_param("/t", "days", 7, 90).unwrap(), 7);
        assert_eq!(parse_bounded_param("/t?days=14", "days", 7, 90).unwrap(), 14);
        assert_eq!(parse_bounded_param("/t?days=500", "days", 7, 90).unwrap(), 90);
        assert!(parse_bounded_param("/t?days=0", "days", 7, 90).is_err());
        assert!(parse_bounded_param("/t?days=soon", "days", 7, 90).is_err());
    }
}
