//! API 错误类型，统一输出 JSON 错误响应。

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

use crate::database::dto::ValidationErrors;
use crate::logs::InvalidLogLevel;
use crate::metadata::MetadataError;

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// API 层错误及其 HTTP 状态码映射
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("{0}")]
    NotConfigured(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail, None),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail, None),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(errors.0),
            ),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, detail, None),
            ApiError::NotConfigured(detail) => (StatusCode::BAD_REQUEST, detail, None),
            ApiError::Upstream(detail) => {
                log::warn!("Upstream metadata error: {}", detail);
                (StatusCode::BAD_GATEWAY, detail, None)
            }
            ApiError::Internal(detail) => {
                log::error!("API internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            success: false,
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ApiError::Conflict("Record already exists".to_string())
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                ApiError::NotFound("Referenced game does not exist".to_string())
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<MetadataError> for ApiError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::NotConfigured(_) => ApiError::NotConfigured(err.to_string()),
            MetadataError::InvalidRequest(detail) => ApiError::BadRequest(detail),
            MetadataError::NotFound(detail) => ApiError::NotFound(detail),
            MetadataError::Connection { .. }
            | MetadataError::Upstream { .. }
            | MetadataError::ResponseParsing { .. } => ApiError::Upstream(err.to_string()),
            MetadataError::HttpClient(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<InvalidLogLevel> for ApiError {
    fn from(err: InvalidLogLevel) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let response = ApiError::NotFound("Game not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Game not found");
        assert!(json.get("errors").is_none());
    }

    #[tokio::test]
    async fn validation_lists_every_message() {
        let errors = ValidationErrors(vec!["title is required".into(), "genre is required".into()]);
        let response = ApiError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let response = ApiError::Internal("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn metadata_errors_map_to_statuses() {
        let cases = [
            (MetadataError::NotConfigured("IGDB"), StatusCode::BAD_REQUEST),
            (
                MetadataError::InvalidRequest("id is required".into()),
                StatusCode::BAD_REQUEST,
            ),
            (MetadataError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (
                MetadataError::Upstream {
                    provider: "IGDB",
                    status: 401,
                    body: "unauthorized".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn not_configured_names_the_provider() {
        let response = ApiError::from(MetadataError::NotConfigured("IGDB")).into_response();
        let json = body_json(response).await;
        assert_eq!(json["message"], "IGDB is not configured");
    }

    #[test]
    fn plain_db_errors_are_internal() {
        let err = ApiError::from(DbErr::RecordNotFound("x".into()));
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
