//! 服务索引、健康检查与运行时日志级别。

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::api::AppState;
use crate::logs::{self, LogLevel};

pub const APP_NAME: &str = "GameTracker API";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct ServiceIndex {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub games: &'static str,
    pub reviews: &'static str,
    pub igdb: &'static str,
    pub moby: &'static str,
    pub health: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LogLevelResponse {
    pub level: LogLevel,
}

#[derive(Debug, Deserialize)]
pub struct LogLevelRequest {
    pub level: String,
}

/// `GET /api`
pub async fn index() -> ApiResponse<ServiceIndex> {
    ApiResponse::ok(ServiceIndex {
        name: APP_NAME,
        version: APP_VERSION,
        endpoints: Endpoints {
            games: "/api/games",
            reviews: "/api/reviews",
            igdb: "/api/igdb",
            moby: "/api/moby",
            health: "/api/health",
        },
    })
    .with_message("GameTracker API - your personal video game library")
}

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Result<ApiResponse<HealthResponse>, ApiError> {
    state
        .db
        .ping()
        .await
        .map_err(|e| ApiError::Internal(format!("database ping failed: {}", e)))?;

    Ok(ApiResponse::ok(HealthResponse {
        status: "ok",
        version: APP_VERSION,
    }))
}

/// `GET /api/system/log-level`
pub async fn get_log_level() -> ApiResponse<LogLevelResponse> {
    ApiResponse::ok(LogLevelResponse {
        level: logs::current_log_level(),
    })
}

/// `PUT /api/system/log-level`
pub async fn set_log_level(
    payload: Result<Json<LogLevelRequest>, JsonRejection>,
) -> Result<ApiResponse<LogLevelResponse>, ApiError> {
    let Json(payload) = payload?;
    let level: LogLevel = payload.level.parse()?;
    logs::set_log_level(level);
    Ok(ApiResponse::ok(LogLevelResponse { level }).with_message("Log level updated"))
}
