use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use super::{failure, storage_failure, ApiError};
use crate::AppState;

pub fn router() -> axum::Router<Arc<AppState>> {
    axum::Router::new()
        .route("/export", axum::routing::get(export))
        .route("/download/:filename", axum::routing::get(download))
}

#[tracing::instrument(skip(state))]
async fn export(State(state): State<Arc<AppState>>) -> Result<Json<common::ExportInfo>, ApiError> {
    let entries = state
        .store
        .read(|ledger| ledger.leaderboard())
        .await
        .map_err(storage_failure)?;

    let filename = crate::export::export_to_folder(&state.export_folder, &entries)
        .await
        .map_err(|e| {
            tracing::error!("Exporting leaderboard: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(common::ExportInfo {
        success: true,
        filename,
        message: "Data exported".to_owned(),
    }))
}

#[tracing::instrument(skip(state))]
async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let path = crate::export::download_path(&state.export_folder, &filename)
        .map_err(|e| failure(StatusCode::BAD_REQUEST, e.to_string()))?;

    let content = tokio::fs::read(&path)
        .await
        .map_err(|_| failure(StatusCode::NOT_FOUND, "File does not exist"))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        content,
    ))
}
