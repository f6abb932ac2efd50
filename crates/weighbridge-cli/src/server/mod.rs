//! HTTP surface: upload with a streamed progress response, report download.

mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use weighbridge_core::{ReportStore, TicketPipeline};

/// Shared handler state. The report store is passed explicitly so the
/// download handler serves exactly where the pipeline writes.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<TicketPipeline>,
    store: ReportStore,
}

impl AppState {
    pub fn new(pipeline: Arc<TicketPipeline>) -> Self {
        let store = pipeline.store().clone();
        Self { pipeline, store }
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/process", post(handlers::process))
        .route("/download/:filename", get(handlers::download))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
