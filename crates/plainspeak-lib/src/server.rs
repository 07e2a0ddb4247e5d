//! HTTP API.
//!
//! ```text
//! GET  /                   liveness text
//! POST /                   multipart field `image` → JSON result
//! GET  /uploads/<file>     files in the working directory
//! ```
//!
//! Failures are JSON with HTTP 200 and `success: false`; callers inspect the
//! body, not the status. CORS is permissive so a browser front end on another
//! origin can call it.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{debug, error};

use plainspeak_core::types::{
    ErrorResponse, LIVENESS_TEXT, SimplifyResponse, UPLOAD_FIELD, UPLOADS_ROUTE,
};

use crate::error::PipelineError;
use crate::pipeline::{IncomingUpload, Pipeline};

/// Build the axum router around a shared [`Pipeline`].
pub fn router(pipeline: Pipeline, max_upload_bytes: usize) -> Router {
    let uploads = ServeDir::new(pipeline.store().dir());
    Router::new()
        .route("/", get(liveness).post(upload))
        .nest_service(UPLOADS_ROUTE, uploads)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(pipeline)
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        error!("request failed: {self}");
        Json(ErrorResponse::new(self.to_string())).into_response()
    }
}

async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

async fn upload(
    State(pipeline): State<Pipeline>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SimplifyResponse>, PipelineError> {
    let incoming = match multipart {
        Ok(multipart) => read_upload(multipart).await?,
        // Not a multipart body, so there is no file part.
        Err(rejection) => {
            debug!("not a multipart request: {rejection}");
            None
        }
    };
    Ok(Json(pipeline.run(incoming).await?))
}

/// Find the `image` file part. Parts without a filename are form fields,
/// not files, and are skipped.
async fn read_upload(mut multipart: Multipart) -> Result<Option<IncomingUpload>, PipelineError> {
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.map_err(malformed)?;
        return Ok(Some(IncomingUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

fn malformed(e: MultipartError) -> PipelineError {
    PipelineError::MalformedUpload(e.body_text())
}
