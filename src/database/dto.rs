//! 数据传输对象（DTO）。
//!
//! 请求体与查询参数先以全可选字段反序列化，
//! 再由 `validate()` 一次性校验全部字段并转换为仓库层使用的强类型值。
//! 所有错误都会返回，而不只是第一个。

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::pagination::{PageRequest, SortOrder};
use crate::database::repository::games_repository::{GameFilter, GameSort};
use crate::database::repository::reviews_repository::{ReviewFilter, ReviewSort};
use crate::entity::vocabulary::{Difficulty, Genre, Platform, UnknownValue};

pub const PLACEHOLDER_COVER: &str = "https://via.placeholder.com/150";

const TITLE_MAX: usize = 100;
const DEVELOPER_MAX: usize = 50;
const DESCRIPTION_MAX: usize = 500;
const REVIEW_TEXT_MIN: usize = 10;
const REVIEW_TEXT_MAX: usize = 1000;
const MIN_RELEASE_YEAR: i32 = 1900;
const MAX_SCORE: i32 = 5;
const MAX_HOURS_PLAYED: f64 = 100_000.0;

pub const DEFAULT_GAME_PAGE_SIZE: u64 = 50;
pub const DEFAULT_REVIEW_PAGE_SIZE: u64 = 20;

static COVER_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://.+\.(jpg|jpeg|png|gif|webp)$").expect("cover URL pattern")
});

/// 一次校验中发现的全部错误
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", .0.join("; "))]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

// ==================== 游戏 ====================

/// `POST /api/games` 请求体
///
/// 字段保留为原始 JSON，类型错误与其他错误一并报告，
/// 而不是直接拒绝整个请求体。
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertGameData {
    pub title: Option<Value>,
    pub genre: Option<Value>,
    pub platform: Option<Value>,
    pub release_year: Option<Value>,
    pub developer: Option<Value>,
    pub cover_image: Option<Value>,
    pub description: Option<Value>,
    pub completed: Option<Value>,
}

/// 校验通过、可直接插入的游戏
#[derive(Clone, Debug, PartialEq)]
pub struct NewGame {
    pub title: String,
    pub genre: Genre,
    pub platform: Platform,
    pub release_year: i32,
    pub developer: String,
    pub cover_image: String,
    pub description: String,
    pub completed: bool,
}

impl InsertGameData {
    pub fn validate(self) -> Result<NewGame, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = string_input(&mut errors, "title", self.title);
        let title = text_field(&mut errors, "title", title, 1, TITLE_MAX, true);
        let genre = string_input(&mut errors, "genre", self.genre);
        let genre = vocabulary_field::<Genre>(&mut errors, "genre", genre, true);
        let platform = string_input(&mut errors, "platform", self.platform);
        let platform = vocabulary_field::<Platform>(&mut errors, "platform", platform, true);
        let release_year = number_input(&mut errors, "releaseYear", self.release_year);
        let release_year = release_year_field(&mut errors, release_year, true);
        let developer = string_input(&mut errors, "developer", self.developer);
        let developer = text_field(&mut errors, "developer", developer, 1, DEVELOPER_MAX, true);
        let cover_image = match string_input(&mut errors, "coverImage", self.cover_image) {
            Input::Given(url) => cover_image_field(&mut errors, url),
            Input::Missing => Some(PLACEHOLDER_COVER.to_string()),
            Input::Mistyped => None,
        };
        let description = string_input(&mut errors, "description", self.description);
        let description = text_field(
            &mut errors,
            "description",
            description,
            1,
            DESCRIPTION_MAX,
            true,
        );
        let completed = bool_input(&mut errors, "completed", self.completed).or(false);

        match (
            title,
            genre,
            platform,
            release_year,
            developer,
            cover_image,
            description,
        ) {
            (
                Some(title),
                Some(genre),
                Some(platform),
                Some(release_year),
                Some(developer),
                Some(cover_image),
                Some(description),
            ) if errors.is_empty() => Ok(NewGame {
                title,
                genre,
                platform,
                release_year,
                developer,
                cover_image,
                description,
                completed,
            }),
            _ => Err(errors),
        }
    }
}

/// `PUT /api/games/:id` 请求体，未提供的字段保持不变
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGameData {
    pub title: Option<Value>,
    pub genre: Option<Value>,
    pub platform: Option<Value>,
    pub release_year: Option<Value>,
    pub developer: Option<Value>,
    pub cover_image: Option<Value>,
    pub description: Option<Value>,
    pub completed: Option<Value>,
}

/// 校验通过的游戏部分更新
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameChanges {
    pub title: Option<String>,
    pub genre: Option<Genre>,
    pub platform: Option<Platform>,
    pub release_year: Option<i32>,
    pub developer: Option<String>,
    pub cover_image: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateGameData {
    pub fn validate(self) -> Result<GameChanges, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = string_input(&mut errors, "title", self.title);
        let genre = string_input(&mut errors, "genre", self.genre);
        let platform = string_input(&mut errors, "platform", self.platform);
        let release_year = number_input(&mut errors, "releaseYear", self.release_year);
        let developer = string_input(&mut errors, "developer", self.developer);
        let cover_image = string_input(&mut errors, "coverImage", self.cover_image);
        let description = string_input(&mut errors, "description", self.description);

        let changes = GameChanges {
            title: text_field(&mut errors, "title", title, 1, TITLE_MAX, false),
            genre: vocabulary_field(&mut errors, "genre", genre, false),
            platform: vocabulary_field(&mut errors, "platform", platform, false),
            release_year: release_year_field(&mut errors, release_year, false),
            developer: text_field(&mut errors, "developer", developer, 1, DEVELOPER_MAX, false),
            cover_image: cover_image
                .given()
                .and_then(|url| cover_image_field(&mut errors, url)),
            description: text_field(
                &mut errors,
                "description",
                description,
                1,
                DESCRIPTION_MAX,
                false,
            ),
            completed: bool_input(&mut errors, "completed", self.completed).given(),
        };

        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }
}

/// `GET /api/games` 查询参数
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameListQuery {
    pub genre: Option<String>,
    pub platform: Option<String>,
    pub completed: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

/// [`GameListQuery`] 的解析结果
#[derive(Clone, Debug, PartialEq)]
pub struct GameQuery {
    pub filter: GameFilter,
    pub sort: GameSort,
    pub order: SortOrder,
    pub page: PageRequest,
}

impl GameListQuery {
    pub fn parse(self) -> Result<GameQuery, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let filter = GameFilter {
            genre: vocabulary_field(&mut errors, "genre", non_empty(self.genre).into(), false),
            platform: vocabulary_field(
                &mut errors,
                "platform",
                non_empty(self.platform).into(),
                false,
            ),
            completed: non_empty(self.completed).map(|v| v == "true"),
            search: non_empty(self.search),
        };
        let sort = match non_empty(self.sort_by) {
            Some(name) => GameSort::parse(&name).unwrap_or_else(|| {
                errors.push(format!("sortBy '{}' is not a sortable game field", name));
                GameSort::default()
            }),
            None => GameSort::default(),
        };
        let order = SortOrder::parse_lenient(non_empty(self.order).as_deref());
        let limit = number_param(&mut errors, "limit", self.limit);
        let page = number_param(&mut errors, "page", self.page);

        if errors.is_empty() {
            Ok(GameQuery {
                filter,
                sort,
                order,
                page: PageRequest::new(page, limit, DEFAULT_GAME_PAGE_SIZE),
            })
        } else {
            Err(errors)
        }
    }
}

// ==================== 评测 ====================

/// `POST /api/reviews` 请求体
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertReviewData {
    pub game_id: Option<Value>,
    pub score: Option<Value>,
    pub text: Option<Value>,
    pub hours_played: Option<Value>,
    pub difficulty: Option<Value>,
    pub recommended: Option<Value>,
}

/// 校验通过、可直接插入的评测
#[derive(Clone, Debug, PartialEq)]
pub struct NewReview {
    pub game_id: i32,
    pub score: i32,
    pub text: String,
    pub hours_played: f64,
    pub difficulty: Difficulty,
    pub recommended: bool,
}

impl InsertReviewData {
    pub fn validate(self) -> Result<NewReview, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let game_id = match number_input(&mut errors, "gameId", self.game_id) {
            Input::Given(id) => game_id_field(&mut errors, id),
            Input::Missing => {
                errors.push("gameId is required");
                None
            }
            Input::Mistyped => None,
        };
        let score = match number_input(&mut errors, "score", self.score) {
            Input::Given(score) => score_field(&mut errors, score),
            Input::Missing | Input::Mistyped => Some(0),
        };
        let text = string_input(&mut errors, "text", self.text);
        let text = text_field(
            &mut errors,
            "text",
            text,
            REVIEW_TEXT_MIN,
            REVIEW_TEXT_MAX,
            true,
        );
        let hours_played = match number_input(&mut errors, "hoursPlayed", self.hours_played) {
            Input::Given(hours) => hours_field(&mut errors, hours),
            Input::Missing | Input::Mistyped => Some(0.0),
        };
        let difficulty = string_input(&mut errors, "difficulty", self.difficulty);
        let difficulty = vocabulary_field::<Difficulty>(&mut errors, "difficulty", difficulty, true);
        let recommended = bool_input(&mut errors, "recommended", self.recommended).or(true);

        match (game_id, score, text, hours_played, difficulty) {
            (Some(game_id), Some(score), Some(text), Some(hours_played), Some(difficulty))
                if errors.is_empty() =>
            {
                Ok(NewReview {
                    game_id,
                    score,
                    text,
                    hours_played,
                    difficulty,
                    recommended,
                })
            }
            _ => Err(errors),
        }
    }
}

/// `PUT /api/reviews/:id` 请求体，不能更改所属游戏
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewData {
    pub score: Option<Value>,
    pub text: Option<Value>,
    pub hours_played: Option<Value>,
    pub difficulty: Option<Value>,
    pub recommended: Option<Value>,
}

/// 校验通过的评测部分更新
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReviewChanges {
    pub score: Option<i32>,
    pub text: Option<String>,
    pub hours_played: Option<f64>,
    pub difficulty: Option<Difficulty>,
    pub recommended: Option<bool>,
}

impl UpdateReviewData {
    pub fn validate(self) -> Result<ReviewChanges, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let score = number_input(&mut errors, "score", self.score);
        let text = string_input(&mut errors, "text", self.text);
        let hours_played = number_input(&mut errors, "hoursPlayed", self.hours_played);
        let difficulty = string_input(&mut errors, "difficulty", self.difficulty);

        let changes = ReviewChanges {
            score: score.given().and_then(|s| score_field(&mut errors, s)),
            text: text_field(
                &mut errors,
                "text",
                text,
                REVIEW_TEXT_MIN,
                REVIEW_TEXT_MAX,
                false,
            ),
            hours_played: hours_played
                .given()
                .and_then(|h| hours_field(&mut errors, h)),
            difficulty: vocabulary_field(&mut errors, "difficulty", difficulty, false),
            recommended: bool_input(&mut errors, "recommended", self.recommended).given(),
        };

        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }
}

/// `GET /api/reviews` 查询参数
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewListQuery {
    pub game_id: Option<String>,
    pub min_score: Option<String>,
    pub max_score: Option<String>,
    pub difficulty: Option<String>,
    pub recommended: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

/// [`ReviewListQuery`] 的解析结果
#[derive(Clone, Debug, PartialEq)]
pub struct ReviewQuery {
    pub filter: ReviewFilter,
    pub sort: ReviewSort,
    pub order: SortOrder,
    pub page: PageRequest,
}

impl ReviewListQuery {
    pub fn parse(self) -> Result<ReviewQuery, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let filter = ReviewFilter {
            game_id: number_param(&mut errors, "gameId", self.game_id),
            min_score: number_param(&mut errors, "minScore", self.min_score),
            max_score: number_param(&mut errors, "maxScore", self.max_score),
            difficulty: vocabulary_field(
                &mut errors,
                "difficulty",
                non_empty(self.difficulty).into(),
                false,
            ),
            recommended: non_empty(self.recommended).map(|v| v == "true"),
        };
        let sort = match non_empty(self.sort_by) {
            Some(name) => ReviewSort::parse(&name).unwrap_or_else(|| {
                errors.push(format!("sortBy '{}' is not a sortable review field", name));
                ReviewSort::default()
            }),
            None => ReviewSort::default(),
        };
        let order = SortOrder::parse_lenient(non_empty(self.order).as_deref());
        let limit = number_param(&mut errors, "limit", self.limit);
        let page = number_param(&mut errors, "page", self.page);

        if errors.is_empty() {
            Ok(ReviewQuery {
                filter,
                sort,
                order,
                page: PageRequest::new(page, limit, DEFAULT_REVIEW_PAGE_SIZE),
            })
        } else {
            Err(errors)
        }
    }
}

// ==================== 字段校验 ====================

/// 请求体中的原始字段
#[derive(Debug, Clone, PartialEq)]
enum Input<T> {
    /// 未提供或为 `null`
    Missing,
    Given(T),
    /// JSON 类型错误，已记录错误
    Mistyped,
}

impl<T> Input<T> {
    fn given(self) -> Option<T> {
        match self {
            Input::Given(value) => Some(value),
            Input::Missing | Input::Mistyped => None,
        }
    }

    fn or(self, default: T) -> T {
        self.given().unwrap_or(default)
    }

    /// 必填字段缺失时记录错误；类型错误在读取时已记录
    fn require(self, errors: &mut ValidationErrors, field: &str, required: bool) -> Option<T> {
        match self {
            Input::Given(value) => Some(value),
            Input::Missing => {
                if required {
                    errors.push(format!("{} is required", field));
                }
                None
            }
            Input::Mistyped => None,
        }
    }
}

impl<T> From<Option<T>> for Input<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Input::Missing, Input::Given)
    }
}

fn mistyped<T>(errors: &mut ValidationErrors, field: &str, expected: &str) -> Input<T> {
    errors.push(format!("{} must be {}", field, expected));
    Input::Mistyped
}

/// 字符串原样返回，数字按十进制形式接受
fn string_input(errors: &mut ValidationErrors, field: &str, value: Option<Value>) -> Input<String> {
    match value {
        None | Some(Value::Null) => Input::Missing,
        Some(Value::String(s)) => Input::Given(s),
        Some(Value::Number(n)) => Input::Given(n.to_string()),
        Some(_) => mistyped(errors, field, "a string"),
    }
}

/// 接受数字与数字字符串，空白字符串视为未提供
fn number_input(errors: &mut ValidationErrors, field: &str, value: Option<Value>) -> Input<f64> {
    match value {
        None | Some(Value::Null) => Input::Missing,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(n) => Input::Given(n),
            None => mistyped(errors, field, "a number"),
        },
        Some(Value::String(s)) if s.trim().is_empty() => Input::Missing,
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Input::Given(n),
            _ => mistyped(errors, field, "a number"),
        },
        Some(_) => mistyped(errors, field, "a number"),
    }
}

/// 接受布尔值，以及 `"true"`/`"false"`、`"1"`/`"0"` 和 `1`/`0`
fn bool_input(errors: &mut ValidationErrors, field: &str, value: Option<Value>) -> Input<bool> {
    match value {
        None | Some(Value::Null) => Input::Missing,
        Some(Value::Bool(b)) => Input::Given(b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Input::Given(true),
            "false" | "0" => Input::Given(false),
            _ => mistyped(errors, field, "true or false"),
        },
        Some(Value::Number(n)) => match n.as_u64() {
            Some(1) => Input::Given(true),
            Some(0) => Input::Given(false),
            _ => mistyped(errors, field, "true or false"),
        },
        Some(_) => mistyped(errors, field, "true or false"),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 去除首尾空白后按字符数校验长度，空白视为未提供
fn text_field(
    errors: &mut ValidationErrors,
    field: &str,
    value: Input<String>,
    min: usize,
    max: usize,
    required: bool,
) -> Option<String> {
    let value = value.require(errors, field, required)?;

    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        errors.push(format!("{} is required", field));
        None
    } else if len < min {
        errors.push(format!("{} must be at least {} characters", field, min));
        None
    } else if len > max {
        errors.push(format!("{} cannot exceed {} characters", field, max));
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn vocabulary_field<T>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Input<String>,
    required: bool,
) -> Option<T>
where
    T: FromStr<Err = UnknownValue>,
{
    let value = value.require(errors, field, required)?;

    match value.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.push(e.to_string());
            None
        }
    }
}

fn release_year_field(
    errors: &mut ValidationErrors,
    value: Input<f64>,
    required: bool,
) -> Option<i32> {
    let year = value.require(errors, "releaseYear", required)?;

    let current_year = chrono::Utc::now().year();
    if year.fract() != 0.0 {
        errors.push("releaseYear must be a whole number");
        None
    } else if (MIN_RELEASE_YEAR as f64..=current_year as f64).contains(&year) {
        Some(year as i32)
    } else {
        errors.push(format!(
            "releaseYear must be between {} and {}",
            MIN_RELEASE_YEAR, current_year
        ));
        None
    }
}

fn game_id_field(errors: &mut ValidationErrors, id: f64) -> Option<i32> {
    if id.fract() == 0.0 && (1.0..=i32::MAX as f64).contains(&id) {
        Some(id as i32)
    } else {
        errors.push("gameId must be a positive whole number");
        None
    }
}

/// 空白时使用占位封面
fn cover_image_field(errors: &mut ValidationErrors, value: String) -> Option<String> {
    let url = value.trim();
    if url.is_empty() || url == PLACEHOLDER_COVER {
        return Some(PLACEHOLDER_COVER.to_string());
    }
    if COVER_URL.is_match(url) {
        Some(url.to_string())
    } else {
        errors.push(
            "coverImage must be an http(s) URL ending in .jpg, .jpeg, .png, .gif or .webp",
        );
        None
    }
}

fn score_field(errors: &mut ValidationErrors, score: f64) -> Option<i32> {
    if !score.is_finite() || score.fract() != 0.0 {
        errors.push("score must be a whole number");
        return None;
    }
    if !(0.0..=MAX_SCORE as f64).contains(&score) {
        errors.push(format!("score must be between 0 and {}", MAX_SCORE));
        return None;
    }
    Some(score as i32)
}

fn hours_field(errors: &mut ValidationErrors, hours: f64) -> Option<f64> {
    if hours.is_finite() && (0.0..=MAX_HOURS_PLAYED).contains(&hours) {
        Some(hours)
    } else {
        errors.push(format!(
            "hoursPlayed must be between 0 and {}",
            MAX_HOURS_PLAYED
        ));
        None
    }
}

fn number_param<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
) -> Option<T> {
    let value = non_empty(value)?;
    match value.parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.push(format!("{} must be a number, got '{}'", field, value));
            None
        }
    }
}
