use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use common::matches::{AddMatchResponse, MatchInput, PreviewRequest};
use scoring::{MatchRecord, Preview};

use super::{failure, storage_failure, ApiError};
use crate::AppState;

pub fn router() -> axum::Router<Arc<AppState>> {
    axum::Router::new()
        .route("/match", axum::routing::post(add))
        .route(
            "/match/:id",
            axum::routing::get(get).put(update).delete(delete),
        )
        .route("/matches", axum::routing::get(list))
        .route("/preview", axum::routing::post(preview))
}

fn draft(input: MatchInput) -> Result<scoring::MatchDraft, ApiError> {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    crate::input::to_draft(input, &today).map_err(|e| {
        tracing::debug!("Rejected match input: {}", e);
        failure(StatusCode::BAD_REQUEST, e.to_string())
    })
}

#[tracing::instrument(skip_all)]
async fn add(
    State(state): State<Arc<AppState>>,
    Json(input): Json<MatchInput>,
) -> Result<Json<AddMatchResponse>, ApiError> {
    let draft = draft(input)?;
    let now = chrono::Local::now().naive_local();

    let committed = state
        .store
        .transaction(|ledger| ledger.add(draft, now))
        .await
        .map_err(storage_failure)?;

    let verdict = &committed.compensation_info;
    let message = if committed.invalid {
        format!(
            "Match recorded as invalid: imbalance of {} points",
            verdict.difference
        )
    } else if verdict.compensation_per_player.is_positive() {
        format!(
            "Match recorded, losers receive +{} each",
            verdict.compensation_per_player
        )
    } else {
        "Match recorded".to_owned()
    };

    Ok(Json(AddMatchResponse {
        success: true,
        match_id: committed.match_id,
        invalid: committed.invalid,
        compensation: verdict.compensation_per_player.as_f64(),
        message,
    }))
}

#[tracing::instrument(skip(state))]
async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<MatchRecord>, ApiError> {
    state
        .store
        .read(|ledger| ledger.get(id).cloned())
        .await
        .map_err(storage_failure)?
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Match does not exist"))
}

#[tracing::instrument(skip(state, input))]
async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(input): Json<MatchInput>,
) -> Result<Json<common::Message>, ApiError> {
    let draft = draft(input)?;

    let updated = state
        .store
        .transaction(|ledger| ledger.update(id, draft))
        .await
        .map_err(storage_failure)?;

    if !updated {
        return Err(failure(StatusCode::NOT_FOUND, "Match does not exist"));
    }

    Ok(Json(common::Message::ok("Match updated")))
}

#[tracing::instrument(skip(state))]
async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<common::Message>, ApiError> {
    let deleted = state
        .store
        .transaction(|ledger| ledger.delete(id))
        .await
        .map_err(storage_failure)?;

    if !deleted {
        return Err(failure(StatusCode::NOT_FOUND, "Match does not exist"));
    }

    Ok(Json(common::Message::ok("Match deleted")))
}

#[tracing::instrument(skip(state))]
async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<MatchRecord>>, ApiError> {
    state
        .store
        .read(|ledger| ledger.list_all().cloned().collect::<Vec<_>>())
        .await
        .map(Json)
        .map_err(storage_failure)
}

#[tracing::instrument(skip(state))]
async fn preview(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<Preview>, ApiError> {
    state
        .store
        .read(|ledger| ledger.preview(&request.radiant, &request.dire))
        .await
        .map(Json)
        .map_err(storage_failure)
}
