//! `/api/reviews` 处理函数。

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::api::AppState;
use crate::database::dto::{InsertReviewData, ReviewListQuery, UpdateReviewData};
use crate::database::repository::games_repository::GamesRepository;
use crate::database::repository::reviews_repository::{
    GameSummary, ReviewSummary, ReviewWithGame, ReviewsRepository,
};
use crate::entity::reviews;

fn review_not_found() -> ApiError {
    ApiError::NotFound("Review not found".to_string())
}

/// 某个游戏的评测列表，附带游戏摘要
#[derive(Debug, Serialize)]
pub struct GameReviews {
    pub success: bool,
    pub data: Vec<reviews::Model>,
    pub game: GameSummary,
}

impl IntoResponse for GameReviews {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `GET /api/reviews`
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ReviewListQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<ReviewWithGame>>, ApiError> {
    let Query(query) = query?;
    let query = query.parse()?;

    let (reviews, total) = ReviewsRepository::find_page(&state.db, &query).await?;
    Ok(ApiResponse::ok(reviews).with_pagination(query.page.describe(total)))
}

/// `GET /api/reviews/:id`
pub async fn detail(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<ApiResponse<ReviewWithGame>, ApiError> {
    let Path(id) = id?;
    let review = ReviewsRepository::find_with_game(&state.db, id)
        .await?
        .ok_or_else(review_not_found)?;
    Ok(ApiResponse::ok(review))
}

/// `GET /api/reviews/game/:game_id`
pub async fn by_game(
    State(state): State<AppState>,
    game_id: Result<Path<i32>, PathRejection>,
) -> Result<GameReviews, ApiError> {
    let Path(game_id) = game_id?;
    let game = GamesRepository::find_by_id(&state.db, game_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Game not found".to_string()))?;

    let reviews = ReviewsRepository::find_by_game(&state.db, game_id).await?;
    Ok(GameReviews {
        success: true,
        data: reviews,
        game: GameSummary::from(&game),
    })
}

/// `POST /api/reviews`
///
/// 每个游戏只能有一条评测，重复创建返回冲突。
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<InsertReviewData>, JsonRejection>,
) -> Result<ApiResponse<ReviewWithGame>, ApiError> {
    let Json(payload) = payload?;
    let review = payload.validate()?;

    let game = GamesRepository::find_by_id(&state.db, review.game_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("The specified game does not exist".to_string()))?;
    if ReviewsRepository::exists_for_game(&state.db, game.id).await? {
        return Err(ApiError::Conflict(
            "This game already has a review; update that review instead".to_string(),
        ));
    }

    let created = ReviewsRepository::insert(&state.db, review).await?;
    log::info!("Added review {} for game {}", created.id, game.id);
    Ok(ApiResponse::created(ReviewWithGame {
        review: created,
        game: Some(GameSummary::from(&game)),
    })
    .with_message("Review created successfully"))
}

/// `PUT /api/reviews/:id`
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateReviewData>, JsonRejection>,
) -> Result<ApiResponse<ReviewWithGame>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let changes = payload.validate()?;

    if ReviewsRepository::update(&state.db, id, changes).await?.is_none() {
        return Err(review_not_found());
    }
    let review = ReviewsRepository::find_with_game(&state.db, id)
        .await?
        .ok_or_else(review_not_found)?;
    Ok(ApiResponse::ok(review).with_message("Review updated successfully"))
}

/// `DELETE /api/reviews/:id`
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<ApiResponse<()>, ApiError> {
    let Path(id) = id?;
    if !ReviewsRepository::delete(&state.db, id).await? {
        return Err(review_not_found());
    }
    log::info!("Deleted review {}", id);
    Ok(ApiResponse::message_only("Review deleted successfully"))
}

/// `GET /api/reviews/stats/summary`
pub async fn summary(
    State(state): State<AppState>,
) -> Result<ApiResponse<ReviewSummary>, ApiError> {
    Ok(ApiResponse::ok(ReviewsRepository::summary(&state.db).await?))
}
