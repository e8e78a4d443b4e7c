use super::types::{ErrorResponse, HealthResponse, ProcessImageResponse};
use crate::pipeline::{InvoicePipeline, UploadedImage};
use axum::{
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

/// Multipart field carrying the invoice image.
pub const UPLOAD_FIELD: &str = "invoiceImage";
pub const NO_IMAGE_MESSAGE: &str = "No image uploaded";

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<InvoicePipeline>,
}

pub async fn process_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProcessImageResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    let multipart = multipart.map_err(|rejection| {
        warn!("[{}] Request is not multipart: {}", request_id, rejection);
        no_image()
    })?;

    let Some(image) = read_upload(multipart).await? else {
        info!("[{}] Rejected request without '{}' file", request_id, UPLOAD_FIELD);
        return Err(no_image());
    };

    info!(
        "[{}] Received image {} ({} bytes, {})",
        request_id,
        image.file_name.as_deref().unwrap_or("<unnamed>"),
        image.len(),
        image.content_type.as_deref().unwrap_or("unknown type")
    );

    match state
        .pipeline
        .process(&image)
        .instrument(info_span!("process_image", %request_id))
        .await
    {
        Ok(processed) => {
            info!(
                "[{}] Processed image (structured: {})",
                request_id,
                processed.structured.is_parsed()
            );
            Ok(Json(processed.into()))
        }
        Err(e) => {
            error!("[{}] Failed to process image: {}", request_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// First `UPLOAD_FIELD` file part wins. Text parts under that name are
/// ignored and a zero-length file counts as missing.
async fn read_upload(mut multipart: Multipart) -> Result<Option<UploadedImage>, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        if field.file_name().is_none() {
            debug!("Skipping '{}' part without a filename", UPLOAD_FIELD);
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        if bytes.is_empty() {
            return Ok(None);
        }

        let mut image = UploadedImage::new(bytes);
        image.content_type = content_type;
        image.file_name = file_name;
        return Ok(Some(image));
    }

    Ok(None)
}

fn no_image() -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: NO_IMAGE_MESSAGE.to_string(),
        }),
    )
}

fn multipart_error(e: MultipartError) -> ApiError {
    warn!("Failed to read multipart body: {}", e);
    (
        e.status(),
        Json(ErrorResponse {
            error: e.body_text(),
        }),
    )
}
