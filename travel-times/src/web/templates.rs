//! Askama templates for the web frontend.

use askama::Template;

use crate::results::{PreviewRow, ResultRow};

use super::state::JobSnapshot;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Home page with the upload form.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    /// Whether to show the API key field
    pub needs_api_key: bool,
}

/// Progress and results of a job.
#[derive(Template)]
#[template(path = "job.html")]
pub struct JobTemplate {
    pub job: JobView,
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
    pub details: Vec<String>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Job view model for templates.
#[derive(Debug, Clone)]
pub struct JobView {
    pub job_id: u64,
    pub file_name: String,
    pub started_at: String,
    pub total: usize,
    pub done: usize,
    pub success: usize,
    pub errors: usize,
    pub finished: bool,
    pub cancelled: bool,
    pub rows: Vec<PreviewRow>,
    pub failures: Vec<FailureView>,
}

impl JobView {
    /// Create from a job snapshot.
    pub fn from_snapshot(
        job_id: u64,
        file_name: &str,
        started_at: String,
        snapshot: &JobSnapshot,
    ) -> Self {
        let summary = snapshot.results.summary();
        Self {
            job_id,
            file_name: file_name.to_string(),
            started_at,
            total: snapshot.total,
            done: summary.total,
            success: summary.success,
            errors: summary.errors,
            finished: snapshot.finished,
            cancelled: snapshot.cancelled,
            rows: snapshot.results.preview(),
            failures: snapshot
                .results
                .failures()
                .map(FailureView::from_result)
                .collect(),
        }
    }

    /// Completion as a whole percentage.
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            100
        } else {
            self.done * 100 / self.total
        }
    }

    /// Whether trips are still being routed.
    pub fn is_running(&self) -> bool {
        !self.finished
    }

    /// Short label for the progress header.
    pub fn state_label(&self) -> &'static str {
        match (self.finished, self.cancelled) {
            (false, _) => "En cours",
            (true, true) => "Annulé",
            (true, false) => "Terminé",
        }
    }
}

/// A failed trip, with full values for diagnosis.
#[derive(Debug, Clone)]
pub struct FailureView {
    pub row: usize,
    pub origin: String,
    pub destination: String,
    pub status: String,
}

impl FailureView {
    pub fn from_result(result: &ResultRow) -> Self {
        Self {
            row: result.row,
            origin: result.request.origin.clone(),
            destination: result.request.destination.clone(),
            status: result.outcome.status().to_string(),
        }
    }
}
