//! Data transfer objects for web requests and responses.

use serde::Serialize;

use crate::results::ResultRow;

use super::state::JobSnapshot;

/// Response to a successful upload.
#[derive(Debug, Serialize)]
pub struct JobCreatedResponse {
    /// ID to poll at `/jobs/{job_id}`
    pub job_id: u64,

    /// Number of trips in the file
    pub total: usize,
}

/// State of a job.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: u64,

    /// Name of the uploaded file
    pub file_name: String,

    /// Trips in the file
    pub total: usize,

    /// Trips routed so far
    pub done: usize,

    pub success: usize,
    pub errors: usize,

    /// Whether the batch has stopped, normally or not
    pub finished: bool,

    /// Whether the batch was cancelled before the end
    pub cancelled: bool,

    /// Routed trips with full values
    pub rows: Vec<TripResult>,
}

impl JobStatusResponse {
    /// Build from a job snapshot.
    pub fn from_snapshot(job_id: u64, file_name: &str, snapshot: &JobSnapshot) -> Self {
        let summary = snapshot.results.summary();
        Self {
            job_id,
            file_name: file_name.to_string(),
            total: snapshot.total,
            done: summary.total,
            success: summary.success,
            errors: summary.errors,
            finished: snapshot.finished,
            cancelled: snapshot.cancelled,
            rows: snapshot
                .results
                .rows()
                .iter()
                .map(TripResult::from_result)
                .collect(),
        }
    }
}

/// One routed trip.
#[derive(Debug, Serialize)]
pub struct TripResult {
    /// 1-based row number in the input file
    pub row: usize,
    pub origin: String,
    pub destination: String,
    pub mode: String,
    pub duration: String,
    pub distance: String,
    pub status: String,
    pub success: bool,
}

impl TripResult {
    pub fn from_result(result: &ResultRow) -> Self {
        Self {
            row: result.row,
            origin: result.request.origin.clone(),
            destination: result.request.destination.clone(),
            mode: result.request.mode_label.clone(),
            duration: result.outcome.duration_text().to_string(),
            distance: result.outcome.distance_text().to_string(),
            status: result.outcome.status().to_string(),
            success: result.outcome.is_success(),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    /// Extra lines, such as the names of missing columns
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TripOutcome, TripRequest};
    use crate::results::Reconciler;

    fn snapshot() -> JobSnapshot {
        let mut results = Reconciler::new(vec!["Origine".into()]);
        results.record(ResultRow {
            row: 1,
            fields: Vec::new(),
            request: TripRequest::new("A", "B", "VELO"),
            outcome: TripOutcome::success("10 minutes", "2 km", false),
        });
        results.record(ResultRow {
            row: 2,
            fields: Vec::new(),
            request: TripRequest::new("C", "D", "VELO"),
            outcome: TripOutcome::api_error("REQUEST_DENIED"),
        });
        JobSnapshot {
            results,
            total: 5,
            finished: false,
            cancelled: false,
        }
    }

    #[test]
    fn status_counts() {
        let status = JobStatusResponse::from_snapshot(3, "trajets.csv", &snapshot());
        assert_eq!(status.done, 2);
        assert_eq!(status.total, 5);
        assert_eq!(status.success, 1);
        assert_eq!(status.errors, 1);
        assert_eq!(status.rows[1].status, "❌ Erreur API: REQUEST_DENIED");
        assert_eq!(status.rows[1].duration, "Erreur");
    }

    #[test]
    fn error_details_omitted_when_empty() {
        let json = serde_json::to_string(&ErrorResponse {
            error: "not found".into(),
            details: Vec::new(),
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"not found"}"#);
    }
}
