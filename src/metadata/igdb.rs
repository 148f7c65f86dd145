//! IGDB（api.igdb.com）适配器。
//!
//! 以 Apicalypse 查询体 POST 到 `/games`，
//! 使用 Twitch client id 与应用访问令牌认证。

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::{capped_limit, http_client, send_json, trim_base_url, GameDraft, MetadataError};
use crate::config::IgdbConfig;
use crate::entity::vocabulary::{Genre, Platform};

const PROVIDER: &str = "IGDB";
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 20;

const SEARCH_FIELDS: &str = "fields name, cover.url, first_release_date, genres.name, platforms.name, involved_companies.company.name, involved_companies.developer;";
const DETAIL_FIELDS: &str = "fields name, cover.url, first_release_date, genres.name, platforms.name, involved_companies.company.name, involved_companies.developer, summary, storyline;";

#[derive(Debug, Clone)]
struct Credentials {
    client_id: String,
    access_token: String,
}

pub struct IgdbClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

/// 单条搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IgdbSuggestion {
    pub id: u64,
    pub title: String,
    pub release_year: Option<i32>,
    pub platforms: Vec<String>,
    pub genres: Vec<String>,
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct IgdbGame {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    cover: Option<IgdbCover>,
    #[serde(default)]
    first_release_date: Option<i64>,
    #[serde(default)]
    genres: Vec<Named>,
    #[serde(default)]
    platforms: Vec<Named>,
    #[serde(default)]
    involved_companies: Vec<InvolvedCompany>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    storyline: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct IgdbCover {
    #[serde(default)]
    url: Option<String>,
}

/// 展开的引用带名称，未展开的只有 id
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Named {
    Object {
        #[serde(default)]
        id: Option<u64>,
        #[serde(default)]
        name: Option<String>,
    },
    Id(u64),
}

impl Named {
    fn label(&self) -> Option<String> {
        match self {
            Named::Object { name: Some(name), .. } => Some(name.clone()),
            Named::Object { id: Some(id), .. } | Named::Id(id) => Some(id.to_string()),
            Named::Object { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct InvolvedCompany {
    #[serde(default)]
    company: Option<Company>,
    #[serde(default)]
    developer: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Company {
    #[serde(default)]
    name: Option<String>,
}

impl IgdbClient {
    pub fn new(config: &IgdbConfig, timeout_secs: u64) -> Result<Self, MetadataError> {
        let credentials = match (&config.client_id, &config.access_token) {
            (Some(client_id), Some(access_token)) => Some(Credentials {
                client_id: client_id.clone(),
                access_token: access_token.clone(),
            }),
            _ => None,
        };

        Ok(Self {
            http: http_client(timeout_secs)?,
            base_url: trim_base_url(&config.api_base),
            credentials,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// 按标题搜索，关键词为空时直接返回空结果，不请求 IGDB
    pub async fn search(
        &self,
        term: Option<&str>,
        limit: Option<&str>,
    ) -> Result<Vec<IgdbSuggestion>, MetadataError> {
        let credentials = self.credentials()?;
        let term = term.map(str::trim).unwrap_or_default();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let limit = capped_limit(limit, DEFAULT_LIMIT, MAX_LIMIT);

        log::debug!("IGDB search '{}' (limit {})", term, limit);
        let games = self
            .query(credentials, search_query(term, limit))
            .await?;
        Ok(games.iter().map(suggestion_from).collect())
    }

    /// 获取单个游戏的完整信息并转换为草稿
    pub async fn game(&self, id: Option<&str>) -> Result<GameDraft, MetadataError> {
        let credentials = self.credentials()?;
        let id = parse_game_id(id)?;

        let games = self.query(credentials, detail_query(id)).await?;
        games
            .into_iter()
            .next()
            .map(|game| draft_from(&game))
            .ok_or_else(|| MetadataError::NotFound(format!("IGDB game {} not found", id)))
    }

    fn credentials(&self) -> Result<&Credentials, MetadataError> {
        self.credentials
            .as_ref()
            .ok_or(MetadataError::NotConfigured(PROVIDER))
    }

    async fn query(
        &self,
        credentials: &Credentials,
        body: String,
    ) -> Result<Vec<IgdbGame>, MetadataError> {
        let request = self
            .http
            .post(format!("{}/games", self.base_url))
            .header("Client-ID", &credentials.client_id)
            .bearer_auth(&credentials.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body);
        send_json(PROVIDER, request).await
    }
}

fn parse_game_id(raw: Option<&str>) -> Result<u64, MetadataError> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| MetadataError::InvalidRequest("id must be a positive integer".to_string()))
}

pub(crate) fn search_query(term: &str, limit: u32) -> String {
    [
        SEARCH_FIELDS.to_string(),
        format!("search \"{}\";", term.replace('"', "\\\"")),
        format!("limit {};", limit),
    ]
    .join("\n")
}

pub(crate) fn detail_query(id: u64) -> String {
    [
        DETAIL_FIELDS.to_string(),
        format!("where id = {};", id),
        "limit 1;".to_string(),
    ]
    .join("\n")
}

/// 将 `//images.igdb.com/...t_thumb/x.jpg` 转换为完整的大封面 URL
pub(crate) fn cover_url(raw: &str) -> String {
    let url = if raw.starts_with("//") {
        format!("https:{}", raw)
    } else {
        raw.to_string()
    };
    url.replace("t_thumb", "t_cover_big")
}

fn release_year(unix_seconds: Option<i64>) -> Option<i32> {
    unix_seconds
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|date| date.year())
}

fn company_name(involved: &InvolvedCompany) -> Option<String> {
    involved.company.as_ref().and_then(|c| c.name.clone())
}

/// 取第一个标记为开发商的公司，否则取第一个有名称的公司
fn developer(game: &IgdbGame) -> Option<String> {
    game.involved_companies
        .iter()
        .filter(|ic| ic.developer)
        .find_map(company_name)
        .or_else(|| game.involved_companies.iter().find_map(company_name))
}

pub(crate) fn suggestion_from(game: &IgdbGame) -> IgdbSuggestion {
    IgdbSuggestion {
        id: game.id,
        title: game.name.clone().unwrap_or_default(),
        release_year: release_year(game.first_release_date),
        platforms: game.platforms.iter().filter_map(Named::label).collect(),
        genres: game.genres.iter().filter_map(Named::label).collect(),
        cover_url: game
            .cover
            .as_ref()
            .and_then(|c| c.url.as_deref())
            .map(cover_url),
    }
}

pub(crate) fn draft_from(game: &IgdbGame) -> GameDraft {
    let basic = suggestion_from(game);
    let description = [&game.summary, &game.storyline]
        .into_iter()
        .flatten()
        .find(|text| !text.trim().is_empty())
        .cloned()
        .unwrap_or_default();

    GameDraft {
        source_id: game.id,
        title: basic.title,
        genre: basic.genres.first().map(|g| Genre::from_provider_name(g)),
        platform: basic.platforms.first().map(|p| Platform::from_provider_name(p)),
        release_year: basic.release_year,
        developer: developer(game).unwrap_or_default(),
        cover_image: basic.cover_url.unwrap_or_default(),
        description,
    }
}
