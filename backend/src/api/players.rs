use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use scoring::report::{LeaderboardEntry, PlayerDetail, PlayerSummary};
use scoring::Tier;

use super::{failure, storage_failure, ApiError};
use crate::AppState;

pub fn router() -> axum::Router<Arc<AppState>> {
    axum::Router::new()
        .route("/players", axum::routing::get(list))
        .route("/player/:name", axum::routing::get(detail))
        .route("/leaderboard", axum::routing::get(leaderboard))
        .route("/horses", axum::routing::get(horses))
        .route("/horse", axum::routing::put(set_horse))
        .route("/horse/:name", axum::routing::delete(remove_horse))
}

#[tracing::instrument(skip(state))]
async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PlayerSummary>>, ApiError> {
    state
        .store
        .read(|ledger| ledger.standings())
        .await
        .map(Json)
        .map_err(storage_failure)
}

#[tracing::instrument(skip(state))]
async fn detail(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<PlayerDetail>, ApiError> {
    state
        .store
        .read(|ledger| ledger.player_detail(&name))
        .await
        .map_err(storage_failure)?
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Player does not exist"))
}

#[tracing::instrument(skip(state))]
async fn leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    state
        .store
        .read(|ledger| ledger.leaderboard())
        .await
        .map(Json)
        .map_err(storage_failure)
}

#[tracing::instrument(skip(state))]
async fn horses(State(state): State<Arc<AppState>>) -> Result<Json<Vec<common::HorseLevel>>, ApiError> {
    let tiers = state
        .store
        .read(|ledger| ledger.all_tiers())
        .await
        .map_err(storage_failure)?;

    Ok(Json(
        tiers
            .into_iter()
            .map(|(name, tier)| common::HorseLevel {
                name,
                horse_level: tier.map(|t| t.label().to_owned()),
            })
            .collect(),
    ))
}

#[tracing::instrument(skip(state))]
async fn set_horse(
    State(state): State<Arc<AppState>>,
    Json(request): Json<common::HorseOverride>,
) -> Result<Json<common::Message>, ApiError> {
    let name = request.name.trim().to_owned();
    if name.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "A player name is required"));
    }
    let tier: Tier = request
        .level
        .parse()
        .map_err(|e: String| failure(StatusCode::BAD_REQUEST, e))?;

    state
        .store
        .transaction(|ledger| ledger.set_override(name.as_str(), tier))
        .await
        .map_err(storage_failure)?;

    Ok(Json(common::Message::ok(format!("{} is now {}", name, tier))))
}

#[tracing::instrument(skip(state))]
async fn remove_horse(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<common::Message>, ApiError> {
    let removed = state
        .store
        .transaction(|ledger| ledger.remove_override(&name))
        .await
        .map_err(storage_failure)?;

    if !removed {
        return Err(failure(StatusCode::NOT_FOUND, "No manual tier for this player"));
    }

    Ok(Json(common::Message::ok(format!("{} is ranked automatically again", name))))
}
