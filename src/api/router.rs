//! 路由表。
//!
//! 路径参数使用 `:param` 语法（matchit 0.7 / axum 0.7）。
//! `stats/summary` 等静态段优先于 `:id` 匹配。

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::error::ApiError;
use crate::api::{games, metadata, reviews, system, AppState};

/// 不含 CORS 与追踪中间件的 API 路由
pub fn api_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(system::index))
        .route("/health", get(system::health))
        .route(
            "/system/log-level",
            get(system::get_log_level).put(system::set_log_level),
        )
        .route("/games", get(games::list).post(games::create))
        .route("/games/stats/summary", get(games::summary))
        .route(
            "/games/:id",
            get(games::detail).put(games::update).delete(games::delete),
        )
        .route("/reviews", get(reviews::list).post(reviews::create))
        .route("/reviews/stats/summary", get(reviews::summary))
        .route("/reviews/game/:game_id", get(reviews::by_game))
        .route(
            "/reviews/:id",
            get(reviews::detail)
                .put(reviews::update)
                .delete(reviews::delete),
        )
        .route("/igdb/search", get(metadata::igdb_search))
        .route("/igdb/game", get(metadata::igdb_game))
        .route("/moby/search", get(metadata::moby_search))
        .route("/moby/game", get(metadata::moby_game))
        .with_state(state);

    Router::new().nest("/api", api).fallback(route_not_found)
}

/// 完整应用：路由加上 CORS 与请求追踪
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    api_routes(state)
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            log::warn!("Invalid CORS origin '{}': {}; cross-origin requests disabled", origin, e);
            layer
        }
    }
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("The requested route does not exist".to_string())
}
