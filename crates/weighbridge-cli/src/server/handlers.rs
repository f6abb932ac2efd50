use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use futures_util::stream;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use weighbridge_core::{ProgressEvent, ReportFormat};

use super::AppState;

const UPLOAD_FIELD: &str = "pdf";

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "weighbridge",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Accept a PDF upload and stream progress frames while it is processed.
pub async fn process(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let (filename, data) = read_upload(&mut multipart).await?;
    info!("Received {} ({} bytes)", filename, data.len());

    let (tx, rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let failure_tx = tx.clone();
    let pipeline = state.pipeline.clone();

    let worker = tokio::task::spawn_blocking(move || {
        let mut sink = |event: ProgressEvent| {
            if tx.send(event).is_err() {
                debug!("Progress receiver dropped");
            }
        };
        pipeline.run(&data, &mut sink);
    });

    // A panicking worker never emits its terminal event.
    tokio::spawn(async move {
        if let Err(e) = worker.await {
            error!("Processing worker failed: {}", e);
            let _ = failure_tx.send(ProgressEvent::Error {
                message: "Internal error while processing the document".to_string(),
            });
        }
    });

    let frames = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((Ok::<_, Infallible>(event.to_sse_frame()), rx))
    });

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(frames),
    )
        .into_response())
}

async fn read_upload(multipart: &mut Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, &format!("Upload error: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(api_error(StatusCode::BAD_REQUEST, "No file selected"));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, &format!("Read error: {}", e)))?;
        return Ok((filename, data));
    }

    Err(api_error(StatusCode::BAD_REQUEST, "No PDF file uploaded"))
}

/// Serve a stored report as an attachment.
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let not_found = || api_error(StatusCode::NOT_FOUND, "File not found");

    let Some(path) = state.store.locate(&filename) else {
        warn!("Download of unknown report {:?}", filename);
        return Err(not_found());
    };
    let data = tokio::fs::read(&path).await.map_err(|e| {
        warn!("Failed to read {}: {}", path.display(), e);
        not_found()
    })?;

    let content_type = ReportFormat::from_filename(&filename)
        .map(|f| f.content_type())
        .unwrap_or("application/octet-stream");

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        data,
    )
        .into_response())
}
