use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use common::matches::UploadResult;

use super::{failure, ApiError};
use crate::{AppState, UploadError};

const MAX_UPLOAD_SIZE: usize = 16 * 1024 * 1024;

pub fn router() -> axum::Router<Arc<AppState>> {
    axum::Router::new().route(
        "/upload",
        axum::routing::post(upload).layer(axum::extract::DefaultBodyLimit::max(MAX_UPLOAD_SIZE)),
    )
}

#[tracing::instrument(skip_all)]
async fn upload(
    State(state): State<Arc<AppState>>,
    form: axum::extract::Multipart,
) -> Result<Json<UploadResult>, ApiError> {
    let image = crate::store_image_from_upload("file", &state.upload_folder, form)
        .await
        .map_err(|e| match e {
            UploadError::MissingFile | UploadError::UnsupportedType | UploadError::Multipart(_) => {
                failure(StatusCode::BAD_REQUEST, e.to_string())
            }
            UploadError::Io(_) => {
                tracing::error!("Storing upload: {}", e);
                failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        })?;

    tracing::info!(filename = %image.filename, "Stored screenshot");

    let mut result = UploadResult {
        image_path: image.path.display().to_string(),
        filename: image.filename,
        api_available: false,
        recognized: None,
        error: None,
    };

    // Recognition can take minutes; key replacement must not wait for it.
    let recognizer = state.recognizer.read().await.clone();
    if !recognizer.is_available() {
        result.error = Some(crate::recognition::RecognitionError::MissingApiKey.to_string());
        return Ok(Json(result));
    }
    result.api_available = true;

    let content = tokio::fs::read(&image.path).await.map_err(|e| {
        tracing::error!("Reading back upload: {}", e);
        failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    match recognizer.recognize(&content, image.mime_type).await {
        Ok(recognized) => result.recognized = Some(recognized),
        Err(e) => {
            tracing::warn!("Recognizing screenshot: {}", e);
            result.error = Some(e.to_string());
        }
    }

    Ok(Json(result))
}
