//! MobyGames（api.mobygames.com）适配器。
//!
//! 未配置 API key 时以演示模式运行，
//! 所有请求都返回固定的 Phoenix Wright: Ace Attorney 数据。

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::{capped_limit, http_client, send_json, trim_base_url, GameDraft, MetadataError};
use crate::config::MobyConfig;
use crate::entity::vocabulary::{Genre, Platform};

const PROVIDER: &str = "MobyGames";
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 25;
const MIN_TERM_CHARS: usize = 2;

const DEMO_ID: u64 = 20581;
const DEMO_TITLE: &str = "Phoenix Wright: Ace Attorney";
const DEMO_YEAR: i32 = 2005;
const DEMO_DESCRIPTION: &str = "Phoenix Wright: Ace Attorney is an investigation and courtroom visual novel whose cases combine exploration, cross-examination and puzzle solving.";

pub struct MobyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobyPlatform {
    pub id: Option<u64>,
    pub name: String,
}

/// 单条搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobySuggestion {
    pub id: Option<u64>,
    pub title: String,
    pub platforms: Vec<MobyPlatform>,
    pub release_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
struct GamesResponse {
    #[serde(default)]
    games: Vec<MobyGame>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MobyGame {
    #[serde(default, alias = "id")]
    game_id: Option<u64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    first_release_year: Option<i32>,
    #[serde(default)]
    first_release_date: Option<String>,
    #[serde(default)]
    platforms: Vec<GamePlatform>,
    #[serde(default)]
    genres: Vec<GameGenre>,
    #[serde(default)]
    companies: Vec<GameCompany>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    brief_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GamePlatform {
    #[serde(default)]
    platform_id: Option<u64>,
    #[serde(default)]
    platform_name: Option<String>,
    #[serde(default)]
    first_release_year: Option<i32>,
    #[serde(default)]
    first_release_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GameGenre {
    #[serde(default)]
    genre_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GameCompany {
    #[serde(default, alias = "company_role")]
    role: Option<String>,
    #[serde(default, alias = "name")]
    company_name: Option<String>,
}

/// 封面接口可能返回 `{ covers: [...] }` 或直接返回数组
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoversResponse {
    Wrapped {
        #[serde(default)]
        covers: Vec<Cover>,
    },
    Bare(Vec<Cover>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Cover {
    #[serde(default, rename = "type", alias = "cover_type")]
    kind: Option<String>,
    #[serde(default, alias = "image_url", alias = "url")]
    image: Option<String>,
}

impl MobyClient {
    pub fn new(config: &MobyConfig, timeout_secs: u64) -> Result<Self, MetadataError> {
        Ok(Self {
            http: http_client(timeout_secs)?,
            base_url: trim_base_url(&config.api_base),
            api_key: config.api_key.clone(),
        })
    }

    pub fn is_demo(&self) -> bool {
        self.api_key.is_none()
    }

    pub async fn search(
        &self,
        term: Option<&str>,
        limit: Option<&str>,
    ) -> Result<Vec<MobySuggestion>, MetadataError> {
        let term = term.map(str::trim).unwrap_or_default();
        if term.chars().count() < MIN_TERM_CHARS {
            return Err(MetadataError::InvalidRequest(format!(
                "q is required and must be at least {} characters",
                MIN_TERM_CHARS
            )));
        }

        let Some(api_key) = &self.api_key else {
            log::debug!("MobyGames demo search for '{}'", term);
            return Ok(vec![demo_suggestion()]);
        };

        let limit = capped_limit(limit, DEFAULT_LIMIT, MAX_LIMIT).to_string();
        let request = self.http.get(format!("{}/games", self.base_url)).query(&[
            ("api_key", api_key.as_str()),
            ("title", term),
            ("format", "brief"),
            ("limit", limit.as_str()),
        ]);
        let response: GamesResponse = send_json(PROVIDER, request).await?;
        Ok(response.games.iter().map(suggestion_from).collect())
    }

    /// 获取单个游戏在某平台上的完整信息并转换为草稿
    pub async fn game(
        &self,
        id: Option<&str>,
        platform_id: Option<&str>,
    ) -> Result<GameDraft, MetadataError> {
        let id = parse_game_id(id)?;

        let Some(api_key) = &self.api_key else {
            return Ok(demo_draft());
        };

        let request = self.http.get(format!("{}/games", self.base_url)).query(&[
            ("api_key", api_key.as_str()),
            ("id", id.to_string().as_str()),
            ("format", "normal"),
        ]);
        let response: GamesResponse = send_json(PROVIDER, request).await?;
        let game = response
            .games
            .into_iter()
            .next()
            .ok_or_else(|| MetadataError::NotFound(format!("MobyGames game {} not found", id)))?;

        let requested = platform_id.and_then(|p| p.trim().parse::<u64>().ok());
        let (platform_id, platform_name) = select_platform(&game, requested);

        let cover_image = match platform_id {
            Some(pid) => self.cover(api_key, id, pid).await,
            None => String::new(),
        };

        Ok(draft_from(
            &game,
            id,
            platform_name,
            cover_image,
            chrono::Utc::now().year(),
        ))
    }

    /// 尽力查找正面封面，失败时返回空字符串
    async fn cover(&self, api_key: &str, game_id: u64, platform_id: u64) -> String {
        let request = self
            .http
            .get(format!(
                "{}/games/{}/platforms/{}/covers",
                self.base_url, game_id, platform_id
            ))
            .query(&[("api_key", api_key)]);

        match send_json::<CoversResponse>(PROVIDER, request).await {
            Ok(CoversResponse::Wrapped { covers }) | Ok(CoversResponse::Bare(covers)) => {
                pick_cover(&covers)
            }
            Err(e) => {
                log::warn!("MobyGames cover lookup failed for game {}: {}", game_id, e);
                String::new()
            }
        }
    }
}

fn parse_game_id(raw: Option<&str>) -> Result<u64, MetadataError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| MetadataError::InvalidRequest("id is required".to_string()))?;
    raw.parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| MetadataError::InvalidRequest("id must be a positive integer".to_string()))
}

pub fn demo_suggestion() -> MobySuggestion {
    MobySuggestion {
        id: Some(DEMO_ID),
        title: DEMO_TITLE.to_string(),
        platforms: ["Nintendo DS", "iPhone", "Wii"]
            .into_iter()
            .map(|name| MobyPlatform {
                id: None,
                name: name.to_string(),
            })
            .collect(),
        release_year: Some(DEMO_YEAR),
    }
}

pub fn demo_draft() -> GameDraft {
    GameDraft {
        source_id: DEMO_ID,
        title: DEMO_TITLE.to_string(),
        genre: Some(Genre::Adventure),
        platform: Some(Platform::from_provider_name("Nintendo DS")),
        release_year: Some(DEMO_YEAR),
        developer: "Capcom".to_string(),
        cover_image: String::new(),
        description: DEMO_DESCRIPTION.to_string(),
    }
}

/// 取 `YYYY`、`YYYY-MM` 或 `YYYY-MM-DD` 开头的四位年份
fn year_of(date: &str) -> Option<i32> {
    date.trim().get(..4)?.parse().ok()
}

/// 依次取 `first_release_year`、`first_release_date` 的年份，
/// 最后取各平台最早的发行年份
pub(crate) fn pick_year(game: &MobyGame) -> Option<i32> {
    game.first_release_year
        .or_else(|| game.first_release_date.as_deref().and_then(year_of))
        .or_else(|| {
            game.platforms
                .iter()
                .flat_map(|p| {
                    [
                        p.first_release_year,
                        p.first_release_date.as_deref().and_then(year_of),
                    ]
                })
                .flatten()
                .min()
        })
}

fn select_platform(game: &MobyGame, requested: Option<u64>) -> (Option<u64>, Option<String>) {
    match requested {
        Some(pid) => {
            let name = game
                .platforms
                .iter()
                .find(|p| p.platform_id == Some(pid))
                .and_then(|p| p.platform_name.clone());
            (Some(pid), name)
        }
        None => game
            .platforms
            .first()
            .map(|p| (p.platform_id, p.platform_name.clone()))
            .unwrap_or((None, None)),
    }
}

pub(crate) fn pick_cover(covers: &[Cover]) -> String {
    covers
        .iter()
        .find(|c| {
            c.kind
                .as_deref()
                .is_some_and(|k| k.to_lowercase().contains("front"))
        })
        .or_else(|| covers.first())
        .and_then(|c| c.image.clone())
        .unwrap_or_default()
}

pub(crate) fn suggestion_from(game: &MobyGame) -> MobySuggestion {
    MobySuggestion {
        id: game.game_id,
        title: game.title.clone().unwrap_or_default(),
        platforms: game
            .platforms
            .iter()
            .map(|p| MobyPlatform {
                id: p.platform_id,
                name: p.platform_name.clone().unwrap_or_default(),
            })
            .collect(),
        release_year: pick_year(game),
    }
}

pub(crate) fn draft_from(
    game: &MobyGame,
    id: u64,
    platform_name: Option<String>,
    cover_image: String,
    current_year: i32,
) -> GameDraft {
    let developer = game
        .companies
        .iter()
        .find(|c| {
            c.role
                .as_deref()
                .is_some_and(|r| r.to_lowercase().contains("developer"))
        })
        .and_then(|c| c.company_name.clone())
        .unwrap_or_default();

    let description = [&game.description, &game.brief_description]
        .into_iter()
        .flatten()
        .find(|text| !text.trim().is_empty())
        .cloned()
        .unwrap_or_default();

    GameDraft {
        source_id: game.game_id.unwrap_or(id),
        title: game.title.clone().unwrap_or_default(),
        genre: game
            .genres
            .iter()
            .find_map(|g| g.genre_name.as_deref())
            .map(Genre::from_provider_name),
        platform: platform_name.as_deref().map(Platform::from_provider_name),
        release_year: Some(pick_year(game).unwrap_or(current_year)),
        developer,
        cover_image,
        description,
    }
}
