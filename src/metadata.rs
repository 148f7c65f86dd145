//! 第三方游戏元数据，用于预填新的游戏条目。
//!
//! 两个数据源都会把响应规整为 [`GameDraft`]，
//! 其中类型与平台已映射到游戏库词表。

pub mod igdb;
pub mod moby;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::entity::vocabulary::{Genre, Platform};

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{provider} is unreachable: {reason}")]
    Connection {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider} returned error (status {status}): {body}")]
    Upstream {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Malformed {provider} response: {reason}")]
    ResponseParsing {
        provider: &'static str,
        reason: String,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// 用于预填游戏表单的规整数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDraft {
    pub source_id: u64,
    pub title: String,
    pub genre: Option<Genre>,
    pub platform: Option<Platform>,
    pub release_year: Option<i32>,
    pub developer: String,
    pub cover_image: String,
    pub description: String,
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, MetadataError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .map_err(|e| MetadataError::HttpClient(e.to_string()))
}

pub(crate) fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// 发送请求并解析成功响应的 JSON
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, MetadataError> {
    let response = request.send().await.map_err(|e| {
        if e.is_connect() || e.is_timeout() {
            MetadataError::Connection {
                provider,
                reason: e.to_string(),
            }
        } else {
            MetadataError::HttpClient(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MetadataError::Upstream {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| MetadataError::ResponseParsing {
            provider,
            reason: e.to_string(),
        })
}

/// `limit` 查询参数：缺失或无法解析时取默认值，并限制上限
pub(crate) fn capped_limit(raw: Option<&str>, default: u32, max: u32) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(default)
        .clamp(1, max)
}
