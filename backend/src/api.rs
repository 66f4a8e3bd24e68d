use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::AppState;

pub mod exports;
pub mod matches;
pub mod players;
pub mod uploads;

pub type ApiError = (StatusCode, Json<common::Message>);

pub fn failure<S>(status: StatusCode, message: S) -> ApiError
where
    S: Into<String>,
{
    (status, Json(common::Message::failed(message)))
}

pub fn storage_failure(err: crate::storage::StorageError) -> ApiError {
    tracing::error!("Accessing league storage: {}", err);
    failure(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/status", axum::routing::get(status))
        .route("/set_api_key", axum::routing::post(set_api_key))
        .merge(matches::router())
        .merge(players::router())
        .merge(uploads::router())
        .merge(exports::router())
        .with_state(state)
}

#[tracing::instrument(skip(state))]
async fn status(State(state): State<Arc<AppState>>) -> Json<common::ServiceStatus> {
    let api_available = state.recognizer.read().await.is_available();

    Json(common::ServiceStatus {
        status: "running".to_owned(),
        api_available,
        timestamp: chrono::Local::now()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string(),
    })
}

#[tracing::instrument(skip_all)]
async fn set_api_key(
    State(state): State<Arc<AppState>>,
    Json(request): Json<common::ApiKeyRequest>,
) -> Result<Json<common::Message>, ApiError> {
    let api_key = request.api_key.trim();
    if api_key.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "API key must not be empty"));
    }

    state.recognizer.write().await.set_api_key(api_key);
    tracing::info!("Replaced Gemini API key");

    if let Some(env_file) = state.env_file.as_ref() {
        if let Err(e) = crate::store_api_key(env_file, api_key).await {
            tracing::error!(?env_file, "Persisting API key: {}", e);
        }
    }

    Ok(Json(common::Message::ok("API key set")))
}
