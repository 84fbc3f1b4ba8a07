//! Wire types for the ingestion and query endpoints.
//!
//! Kept separate from the diesel models in `crate::db::models`: these structs
//! mirror what the upstream activity classifier sends and what callers get
//! back, not the persisted layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{ActivityInterval, CalculatedScore};

/// Seconds spent in each of the seven behavioral buckets within one window.
/// The classifier reports them as non-negative integers; the validator is the
/// only place that enforces that, so the wire type deliberately allows any
/// i32 to come through for full violation reporting.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub typing: i32,
    pub writing: i32,
    pub reading: i32,
    pub phone: i32,
    pub gesturing: i32,
    pub looking_away: i32,
    pub idle: i32,
}

impl CategoryCounts {
    /// Field name / value pairs in wire order, for rule evaluation and messages.
    pub fn named(&self) -> [(&'static str, i32); 7] {
        [
            ("typing", self.typing),
            ("writing", self.writing),
            ("reading", self.reading),
            ("phone", self.phone),
            ("gesturing", self.gesturing),
            ("looking_away", self.looking_away),
            ("idle", self.idle),
        ]
    }

    pub fn total(&self) -> i64 {
        self.named().iter().map(|(_, v)| *v as i64).sum()
    }
}

/// Body of `POST /activities/ingest`. Caller identity (employee/organization)
/// comes from the authenticated request headers, never from the body.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestRequest {
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

/// Qualitative read on a computed score. Deterministic, threshold-driven.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insights {
    pub summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub recommendations: Vec<String>,
}

/// 201 payload for a successful ingestion: the stored raw interval, the
/// freshly recomputed full-day score, and derived insights.
#[derive(Debug, Clone, Serialize)]
pub struct IngestResponse {
    pub interval: ActivityInterval,
    pub score: CalculatedScore,
    pub insights: Insights,
    pub message: String,
}

/// Payload for `GET /activities/latest`: the most recent raw interval plus
/// that day's score (absent when the day's score write failed and has not yet
/// self-healed).
#[derive(Debug, Clone, Serialize)]
pub struct LatestActivity {
    pub interval: ActivityInterval,
    pub score: Option<CalculatedScore>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_request_parses_flat_body() {
        let body = r#"{
            "interval_start": "2025-12-10T09:00:00Z",
            "interval_end": "2025-12-10T09:10:00Z",
            "typing": 300, "writing": 60, "reading": 120,
            "phone": 30, "gesturing": 10, "looking_away": 20, "idle": 60
        }"#;
        let req: IngestRequest = serde_json::from_str(body).expect("parse ingest body");
        assert_eq!(req.counts.typing, 300);
        assert_eq!(req.counts.looking_away, 20);
        assert_eq!(req.counts.total(), 600);
        assert!(req.interval_end > req.interval_start);
    }

    #[test]
    fn ingest_request_rejects_malformed_timestamp() {
        let body = r#"{
            "interval_start": "yesterday-ish",
            "interval_end": "2025-12-10T09:10:00Z",
            "typing": 0, "writing": 0, "reading": 0,
            "phone": 0, "gesturing": 0, "looking_away": 0, "idle": 0
        }"#;
        assert!(serde_json::from_str::<IngestRequest>(body).is_err());
    }
}
