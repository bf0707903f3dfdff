//! Handlers for translation jobs and their artifacts.
//!
//! Submission stores the upload, registers a progress record and hands the
//! job to the worker; everything after that is observed by polling
//! `GET /api/translate/{id}`.

use axum::body::{Body, Bytes};
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use bbm_core::catalog::validate_file_type;
use bbm_core::error::CoreError;
use bbm_core::progress::ProgressSnapshot;
use bbm_core::settings::TranslationSettings;
use bbm_core::types::JobId;
use bbm_worker::JobSpec;
use serde::Serialize;
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::upload::{sanitize_filename, store_upload};

/// Response body for a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub translation_id: JobId,
    pub status: &'static str,
    pub message: &'static str,
}

/// Response body for pause, resume and cancel.
#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub status: &'static str,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a path id; anything that is not a job id cannot name a job.
fn parse_job_id(raw: &str) -> AppResult<JobId> {
    raw.parse().map_err(|_| {
        AppError::Core(CoreError::NotFound {
            entity: "Translation",
            id: raw.to_string(),
        })
    })
}

/// Map multipart failures, keeping the body-limit rejection distinct.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Download name for a stored artifact: the `{job_id}_` prefix removed.
fn download_name(stored: &str, id: JobId) -> String {
    let prefix = format!("{id}_");
    match stored.strip_prefix(&prefix) {
        Some(rest) => rest.to_string(),
        None => stored
            .split_once('_')
            .map_or(stored, |(_, rest)| rest)
            .to_string(),
    }
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/translate
///
/// Accepts a multipart form with a `file` part and an optional `settings`
/// part holding the job configuration as JSON. Returns as soon as the
/// worker thread has been started.
pub async fn submit_translation(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<SubmitResponse>> {
    let mut upload: Option<(String, Bytes)> = None;
    let mut settings_raw: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                upload = Some((filename, data));
            }
            Some("settings") => {
                settings_raw = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let (raw_filename, data) =
        upload.ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;
    if raw_filename.is_empty() {
        return Err(AppError::BadRequest("No file selected".into()));
    }

    let settings = match settings_raw.as_deref() {
        Some(raw) if !raw.trim().is_empty() => TranslationSettings::from_json(raw)?,
        _ => TranslationSettings::default(),
    };

    let filename = sanitize_filename(&raw_filename);
    validate_file_type(&filename)?;

    let id = JobId::new();
    let book_path = store_upload(&state.config.upload_dir, id, &filename, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

    state.registry.create(id)?;

    let spec = JobSpec {
        id,
        book_path,
        settings,
    };
    if let Err(e) = state.worker.spawn(spec) {
        let message = format!("Failed to start translation: {e}");
        if let Err(err) = state.registry.complete(id, |r| r.mark_failed(&message)) {
            tracing::warn!(job_id = %id, error = %err, "Could not complete unstarted job");
        }
        return Err(AppError::InternalError(format!(
            "Failed to spawn worker for {id}: {e}"
        )));
    }

    tracing::info!(job_id = %id, file = %filename, size = data.len(), "Translation submitted");

    Ok(Json(SubmitResponse {
        translation_id: id,
        status: "started",
        message: "Translation job started successfully",
    }))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/translate/{id}
///
/// Current snapshot of an active or completed job.
pub async fn get_translation(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ProgressSnapshot>> {
    let id = parse_job_id(&raw_id)?;
    let record = state.registry.lookup(id)?;
    Ok(Json(record.snapshot()))
}

// ---------------------------------------------------------------------------
// Control
// ---------------------------------------------------------------------------

/// POST /api/translate/{id}/pause
///
/// Relabels an active job as paused. The worker keeps running.
pub async fn pause_translation(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ControlResponse>> {
    let id = parse_job_id(&raw_id)?;
    let record = state.registry.lookup_active(id)?;

    if !record.pause() {
        return Err(CoreError::NotFound {
            entity: "Translation",
            id: id.to_string(),
        }
        .into());
    }

    tracing::info!(job_id = %id, "Translation paused");
    Ok(Json(ControlResponse { status: "paused" }))
}

/// POST /api/translate/{id}/resume
pub async fn resume_translation(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ControlResponse>> {
    let id = parse_job_id(&raw_id)?;
    let record = state.registry.lookup_active(id)?;

    if !record.resume() {
        return Err(CoreError::NotFound {
            entity: "Translation",
            id: id.to_string(),
        }
        .into());
    }

    tracing::info!(job_id = %id, "Translation resumed");
    Ok(Json(ControlResponse { status: "resumed" }))
}

/// DELETE /api/translate/{id}/cancel
///
/// Marks an active job cancelled and moves it to the completed partition.
/// The worker thread is not stopped; its later status changes are ignored.
pub async fn cancel_translation(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ControlResponse>> {
    let id = parse_job_id(&raw_id)?;
    state.registry.cancel(id)?;

    tracing::info!(job_id = %id, "Translation cancelled");
    Ok(Json(ControlResponse {
        status: "cancelled",
    }))
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

/// GET /api/download/{id}
///
/// Streams the finished artifact of a completed job as an attachment.
pub async fn download_translation(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_job_id(&raw_id)?;
    let record = state.registry.lookup_completed(id)?;

    let missing = || {
        AppError::Core(CoreError::NotFound {
            entity: "Output file",
            id: id.to_string(),
        })
    };

    let path = record.output_file().ok_or_else(missing)?;
    let read_error = |e: std::io::Error| {
        AppError::InternalError(format!("Failed to read {}: {e}", path.display()))
    };
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(missing()),
        Err(e) => return Err(read_error(e)),
    };
    let length = file.metadata().await.map_err(read_error)?.len();

    let stored = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let filename = download_name(&stored, id);

    tracing::debug!(job_id = %id, file = %filename, bytes = length, "Streaming artifact");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        Body::from_stream(ReaderStream::new(file)),
    ))
}
