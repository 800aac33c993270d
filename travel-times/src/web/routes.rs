//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::Local;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::input::{LoadError, TripTable};
use crate::maps::{MapsClient, MapsConfig, MapsError};
use crate::results::{ExportError, default_export_name};

use super::dto::*;
use super::state::{AppState, RouterSource};
use super::templates::*;

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/jobs", post(create_job))
        .route("/jobs/:id", get(job_status))
        .route("/jobs/:id/cancel", post(cancel_job))
        .route("/jobs/:id/export.csv", get(export_job))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Index page with the upload form.
async fn index_page(State(state): State<AppState>) -> impl IntoResponse {
    let template = IndexTemplate {
        needs_api_key: state.source.needs_api_key(),
    };
    Html(
        template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

/// Check if the client prefers HTML responses.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Fields of the upload form.
#[derive(Debug, Default)]
struct Upload {
    file_name: Option<String>,
    file: Option<Vec<u8>>,
    api_key: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut upload = Upload::default();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                upload.file_name = field.file_name().map(str::to_string);
                upload.file = Some(field.bytes().await.map_err(bad_multipart)?.to_vec());
            }
            Some("api_key") => {
                upload.api_key = Some(field.text().await.map_err(bad_multipart)?);
            }
            _ => {}
        }
    }

    Ok(upload)
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest {
        message: format!("Formulaire invalide: {e}"),
        details: Vec::new(),
    }
}

/// Upload a trip file and start routing it.
async fn create_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let html = accepts_html(&headers);
    match start_job(&state, multipart).await {
        Ok((job_id, _)) if html => Redirect::to(&format!("/jobs/{job_id}")).into_response(),
        Ok((job_id, total)) => (
            StatusCode::ACCEPTED,
            Json(JobCreatedResponse { job_id, total }),
        )
            .into_response(),
        Err(e) if html => e.into_page(),
        Err(e) => e.into_response(),
    }
}

async fn start_job(state: &AppState, multipart: Multipart) -> Result<(u64, usize), AppError> {
    let upload = read_upload(multipart).await?;

    let bytes = upload.file.ok_or_else(|| AppError::BadRequest {
        message: "Aucun fichier reçu".to_string(),
        details: Vec::new(),
    })?;
    let file_name = upload
        .file_name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "trajets.csv".to_string());

    // The file is checked before any key is used, so a bad file never
    // costs a request.
    let table = TripTable::from_bytes(&bytes)?;
    let total = table.len();

    tracing::info!(file = %file_name, trips = total, "upload accepted");

    let job_id = match state.source.as_ref() {
        RouterSource::Live {
            base_url,
            language,
            timeout_secs,
        } => {
            let api_key = upload.api_key.unwrap_or_default();
            let config = MapsConfig::new(api_key.trim())
                .with_base_url(base_url)
                .with_language(language)
                .with_timeout(*timeout_secs);
            let client = MapsClient::new(config)?;
            state.spawn_job(client, table, file_name).await
        }
        RouterSource::Mock(mock) => state.spawn_job(mock.clone(), table, file_name).await,
    };

    Ok((job_id, total))
}

/// Progress and results of a job.
async fn job_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Response, AppError> {
    let job = state.job(id).await.ok_or_else(|| job_not_found(id))?;
    let snapshot = job.snapshot();

    // Return HTML or JSON based on Accept header
    if accepts_html(&headers) {
        let view = JobView::from_snapshot(
            id,
            &job.file_name,
            job.started_at.format("%d/%m/%Y %H:%M:%S").to_string(),
            &snapshot,
        );
        let html = JobTemplate { job: view }
            .render()
            .map_err(|e| AppError::Internal {
                message: format!("Template error: {}", e),
            })?;

        Ok(Html(html).into_response())
    } else {
        Ok(Json(JobStatusResponse::from_snapshot(id, &job.file_name, &snapshot)).into_response())
    }
}

/// Ask a running job to stop after its current trip.
async fn cancel_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Response, AppError> {
    let job = state.job(id).await.ok_or_else(|| job_not_found(id))?;
    job.cancel.cancel();
    tracing::info!(job = id, "cancellation requested");

    if accepts_html(&headers) {
        Ok(Redirect::to(&format!("/jobs/{id}")).into_response())
    } else {
        Ok(StatusCode::ACCEPTED.into_response())
    }
}

/// Download the results recorded so far.
async fn export_job(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response, AppError> {
    let job = state.job(id).await.ok_or_else(|| job_not_found(id))?;
    let bytes = job.snapshot().results.to_csv_bytes()?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        default_export_name(&Local::now())
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

fn job_not_found(id: u64) -> AppError {
    AppError::NotFound {
        message: format!("Traitement {id} introuvable"),
    }
}

// ============================================================================
// Error handling
// ============================================================================

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest {
        message: String,
        details: Vec<String>,
    },
    NotFound {
        message: String,
    },
    Internal {
        message: String,
    },
}

impl AppError {
    fn parts(self) -> (StatusCode, String, Vec<String>) {
        match self {
            AppError::BadRequest { message, details } => {
                (StatusCode::BAD_REQUEST, message, details)
            }
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message, Vec::new()),
            AppError::Internal { message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, Vec::new())
            }
        }
    }

    /// Render as an HTML error page instead of JSON.
    fn into_page(self) -> Response {
        let (status, message, details) = self.parts();
        tracing::warn!(%status, %message, "request failed");

        let title = if status == StatusCode::BAD_REQUEST {
            "Fichier invalide"
        } else if status == StatusCode::NOT_FOUND {
            "Introuvable"
        } else {
            "Erreur"
        };
        let template = ErrorTemplate {
            title: title.to_string(),
            message,
            details,
        };
        let html = template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e));
        (status, Html(html)).into_response()
    }
}

impl From<LoadError> for AppError {
    fn from(e: LoadError) -> Self {
        match e.missing_columns() {
            Some(missing) => AppError::BadRequest {
                message: "Colonnes manquantes dans le fichier".to_string(),
                details: missing.to_vec(),
            },
            None => AppError::BadRequest {
                message: e.to_string(),
                details: Vec::new(),
            },
        }
    }
}

impl From<MapsError> for AppError {
    fn from(e: MapsError) -> Self {
        match e {
            MapsError::Config(message) => AppError::BadRequest {
                message,
                details: Vec::new(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = self.parts();
        tracing::warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse {
            error: message,
            details,
        });
        (status, body).into_response()
    }
}
