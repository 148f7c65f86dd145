//! `/api/igdb` 与 `/api/moby` 处理函数。

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::api::AppState;
use crate::metadata::GameDraft;
use crate::metadata::igdb::IgdbSuggestion;
use crate::metadata::moby::MobySuggestion;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameParams {
    pub id: Option<String>,
    #[serde(alias = "platform_id")]
    pub platform_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Suggestions<T> {
    pub suggestions: Vec<T>,
}

/// `GET /api/igdb/search`
pub async fn igdb_search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<ApiResponse<Suggestions<IgdbSuggestion>>, ApiError> {
    let Query(params) = params?;
    let suggestions = state
        .igdb
        .search(params.q.as_deref(), params.limit.as_deref())
        .await?;
    Ok(ApiResponse::ok(Suggestions { suggestions }))
}

/// `GET /api/igdb/game`
pub async fn igdb_game(
    State(state): State<AppState>,
    params: Result<Query<GameParams>, QueryRejection>,
) -> Result<ApiResponse<GameDraft>, ApiError> {
    let Query(params) = params?;
    let draft = state.igdb.game(params.id.as_deref()).await?;
    Ok(ApiResponse::ok(draft))
}

/// `GET /api/moby/search`
pub async fn moby_search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<ApiResponse<Suggestions<MobySuggestion>>, ApiError> {
    let Query(params) = params?;
    let suggestions = state
        .moby
        .search(params.q.as_deref(), params.limit.as_deref())
        .await?;
    Ok(with_demo_note(&state, ApiResponse::ok(Suggestions { suggestions })))
}

/// `GET /api/moby/game`
pub async fn moby_game(
    State(state): State<AppState>,
    params: Result<Query<GameParams>, QueryRejection>,
) -> Result<ApiResponse<GameDraft>, ApiError> {
    let Query(params) = params?;
    let draft = state
        .moby
        .game(params.id.as_deref(), params.platform_id.as_deref())
        .await?;
    Ok(with_demo_note(&state, ApiResponse::ok(draft)))
}

/// 演示模式下附加提示，便于客户端区分内置数据与真实结果
fn with_demo_note<T: Serialize>(state: &AppState, response: ApiResponse<T>) -> ApiResponse<T> {
    if state.moby.is_demo() {
        response.with_message("MobyGames demo mode: set MOBY_API_KEY for live results")
    } else {
        response
    }
}
