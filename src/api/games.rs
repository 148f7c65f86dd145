//! `/api/games` 处理函数。

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::api::AppState;
use crate::database::dto::{GameListQuery, InsertGameData, UpdateGameData};
use crate::database::repository::games_repository::{
    GameWithReviews, GamesRepository, LibrarySummary,
};
use crate::entity::games;

fn game_not_found() -> ApiError {
    ApiError::NotFound("Game not found".to_string())
}

/// `GET /api/games`
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<GameListQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<GameWithReviews>>, ApiError> {
    let Query(query) = query?;
    let query = query.parse()?;

    let (games, total) = GamesRepository::find_page(&state.db, &query).await?;
    Ok(ApiResponse::ok(games).with_pagination(query.page.describe(total)))
}

/// `GET /api/games/:id`
pub async fn detail(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<ApiResponse<GameWithReviews>, ApiError> {
    let Path(id) = id?;
    let game = GamesRepository::find_with_reviews(&state.db, id)
        .await?
        .ok_or_else(game_not_found)?;
    Ok(ApiResponse::ok(game))
}

/// `POST /api/games`
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<InsertGameData>, JsonRejection>,
) -> Result<ApiResponse<games::Model>, ApiError> {
    let Json(payload) = payload?;
    let game = payload.validate()?;

    let created = GamesRepository::insert(&state.db, game).await?;
    log::info!("Added game {} '{}'", created.id, created.title);
    Ok(ApiResponse::created(created).with_message("Game added to your library"))
}

/// `PUT /api/games/:id`
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateGameData>, JsonRejection>,
) -> Result<ApiResponse<games::Model>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let changes = payload.validate()?;

    let updated = GamesRepository::update(&state.db, id, changes)
        .await?
        .ok_or_else(game_not_found)?;
    Ok(ApiResponse::ok(updated).with_message("Game updated successfully"))
}

/// `DELETE /api/games/:id`
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<ApiResponse<()>, ApiError> {
    let Path(id) = id?;
    if !GamesRepository::delete_with_reviews(&state.db, id).await? {
        return Err(game_not_found());
    }
    log::info!("Deleted game {}", id);
    Ok(ApiResponse::message_only("Game and its reviews deleted successfully"))
}

/// `GET /api/games/stats/summary`
pub async fn summary(
    State(state): State<AppState>,
) -> Result<ApiResponse<LibrarySummary>, ApiError> {
    Ok(ApiResponse::ok(GamesRepository::summary(&state.db).await?))
}
