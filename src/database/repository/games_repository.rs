//! 游戏数据仓库。
//!
//! 负责游戏列表的筛选、排序与分页，以及统计汇总。
//! 每页的评测通过一次批量查询加载。

use std::collections::HashMap;

use crate::database::dto::{GameChanges, GameQuery, NewGame};
use crate::database::repository::{into_distribution, percentage, NameCount};
use crate::entity::prelude::*;
use crate::entity::{games, reviews};
use sea_orm::sea_query::LikeExpr;
use sea_orm::*;
use serde::{Deserialize, Serialize};

/// 可排序的游戏字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameSort {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Genre,
    Platform,
    ReleaseYear,
    Developer,
    Completed,
}

impl GameSort {
    /// 解析 API 使用的 camelCase 字段名
    pub fn parse(name: &str) -> Option<Self> {
        let sort = match name {
            "createdAt" => GameSort::CreatedAt,
            "updatedAt" => GameSort::UpdatedAt,
            "title" => GameSort::Title,
            "genre" => GameSort::Genre,
            "platform" => GameSort::Platform,
            "releaseYear" => GameSort::ReleaseYear,
            "developer" => GameSort::Developer,
            "completed" => GameSort::Completed,
            _ => return None,
        };
        Some(sort)
    }

    fn column(self) -> games::Column {
        match self {
            GameSort::CreatedAt => games::Column::CreatedAt,
            GameSort::UpdatedAt => games::Column::UpdatedAt,
            GameSort::Title => games::Column::Title,
            GameSort::Genre => games::Column::Genre,
            GameSort::Platform => games::Column::Platform,
            GameSort::ReleaseYear => games::Column::ReleaseYear,
            GameSort::Developer => games::Column::Developer,
            GameSort::Completed => games::Column::Completed,
        }
    }
}

/// 游戏列表筛选条件，`None` 表示不筛选
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameFilter {
    pub genre: Option<Genre>,
    pub platform: Option<Platform>,
    pub completed: Option<bool>,
    /// 标题或开发商的子串，不区分大小写
    pub search: Option<String>,
}

impl GameFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(genre) = self.genre {
            condition = condition.add(games::Column::Genre.eq(genre.as_str()));
        }
        if let Some(platform) = self.platform {
            condition = condition.add(games::Column::Platform.eq(platform.as_str()));
        }
        if let Some(completed) = self.completed {
            condition = condition.add(games::Column::Completed.eq(completed));
        }
        if let Some(term) = &self.search {
            condition = condition.add(games::Column::SearchText.like(search_pattern(term)));
        }
        condition
    }
}

/// SQLite 的 `LIKE` 只对 ASCII 忽略大小写，
/// 因此与游戏一起存储小写文本，并用小写关键词匹配
pub(crate) fn search_key(title: &str, developer: &str) -> String {
    format!("{}\u{1f}{}", title.to_lowercase(), developer.to_lowercase())
}

/// 生成 `%term%`，并转义 `\`、`%` 与 `_`
fn search_pattern(term: &str) -> LikeExpr {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    LikeExpr::new(pattern).escape('\\')
}

/// 游戏及其评测（零条或一条）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameWithReviews {
    #[serde(flatten)]
    pub game: games::Model,
    pub reviews: Vec<reviews::Model>,
}

/// 游戏库统计
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySummary {
    pub total_games: u64,
    pub completed_games: u64,
    pub pending_games: u64,
    pub completion_percentage: u32,
    pub genre_distribution: Vec<NameCount>,
    pub platform_distribution: Vec<NameCount>,
}

/// 游戏数据仓库
pub struct GamesRepository;

impl GamesRepository {
    // ==================== 基础 CRUD 操作 ====================

    pub async fn insert(db: &DatabaseConnection, game: NewGame) -> Result<games::Model, DbErr> {
        let now = chrono::Utc::now();
        let search_text = search_key(&game.title, &game.developer);

        let game_active = games::ActiveModel {
            id: NotSet,
            title: Set(game.title),
            genre: Set(game.genre.as_str().to_string()),
            platform: Set(game.platform.as_str().to_string()),
            release_year: Set(game.release_year),
            developer: Set(game.developer),
            cover_image: Set(game.cover_image),
            description: Set(game.description),
            completed: Set(game.completed),
            search_text: Set(search_text),
            created_at: Set(now),
            updated_at: Set(now),
        };

        game_active.insert(db).await
    }

    /// 部分更新游戏，游戏不存在时返回 `None`
    pub async fn update(
        db: &DatabaseConnection,
        game_id: i32,
        changes: GameChanges,
    ) -> Result<Option<games::Model>, DbErr> {
        let search_text = if changes.title.is_some() || changes.developer.is_some() {
            let Some(current) = Games::find_by_id(game_id).one(db).await? else {
                return Ok(None);
            };
            Set(search_key(
                changes.title.as_deref().unwrap_or(&current.title),
                changes.developer.as_deref().unwrap_or(&current.developer),
            ))
        } else {
            NotSet
        };

        let game_active = games::ActiveModel {
            id: Set(game_id),
            title: changes.title.map_or(NotSet, Set),
            genre: changes
                .genre
                .map_or(NotSet, |g| Set(g.as_str().to_string())),
            platform: changes
                .platform
                .map_or(NotSet, |p| Set(p.as_str().to_string())),
            release_year: changes.release_year.map_or(NotSet, Set),
            developer: changes.developer.map_or(NotSet, Set),
            cover_image: changes.cover_image.map_or(NotSet, Set),
            description: changes.description.map_or(NotSet, Set),
            completed: changes.completed.map_or(NotSet, Set),
            search_text,
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        match game_active.update(db).await {
            Ok(game) => Ok(Some(game)),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// 在同一事务中删除游戏及其评测
    ///
    /// 游戏不存在时返回 `false`。
    pub async fn delete_with_reviews(db: &DatabaseConnection, game_id: i32) -> Result<bool, DbErr> {
        let txn = db.begin().await?;

        let removed_reviews = Reviews::delete_many()
            .filter(reviews::Column::GameId.eq(game_id))
            .exec(&txn)
            .await?;
        let result = Games::delete_by_id(game_id).exec(&txn).await?;

        txn.commit().await?;

        if result.rows_affected > 0 {
            log::debug!(
                "Deleted game {} and {} review(s)",
                game_id,
                removed_reviews.rows_affected
            );
        }
        Ok(result.rows_affected > 0)
    }

    // ==================== 查询操作 ====================

    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<games::Model>, DbErr> {
        Games::find_by_id(id).one(db).await
    }

    pub async fn find_with_reviews(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<GameWithReviews>, DbErr> {
        let Some(game) = Games::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        let reviews = game.find_related(Reviews).all(db).await?;
        Ok(Some(GameWithReviews { game, reviews }))
    }

    /// 按条件查询一页游戏，并返回匹配总数
    pub async fn find_page(
        db: &DatabaseConnection,
        query: &GameQuery,
    ) -> Result<(Vec<GameWithReviews>, u64), DbErr> {
        let select = Games::find().filter(query.filter.condition());
        let total = select.clone().count(db).await?;

        let order: Order = query.order.into();
        let games = select
            .order_by(query.sort.column(), order.clone())
            .order_by(games::Column::Id, order)
            .offset(query.page.offset())
            .limit(query.page.limit)
            .all(db)
            .await?;

        Ok((Self::attach_reviews(db, games).await?, total))
    }

    pub async fn count(db: &DatabaseConnection) -> Result<u64, DbErr> {
        Games::find().count(db).await
    }

    pub async fn summary(db: &DatabaseConnection) -> Result<LibrarySummary, DbErr> {
        let total_games = Self::count(db).await?;
        let completed_games = Games::find()
            .filter(games::Column::Completed.eq(true))
            .count(db)
            .await?;

        Ok(LibrarySummary {
            total_games,
            completed_games,
            pending_games: total_games.saturating_sub(completed_games),
            completion_percentage: percentage(completed_games, total_games),
            genre_distribution: Self::count_by(db, games::Column::Genre).await?,
            platform_distribution: Self::count_by(db, games::Column::Platform).await?,
        })
    }

    // ==================== 私有辅助函数 ====================

    /// 用一次查询加载 `games` 中所有游戏的评测
    async fn attach_reviews(
        db: &DatabaseConnection,
        games: Vec<games::Model>,
    ) -> Result<Vec<GameWithReviews>, DbErr> {
        if games.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = games.iter().map(|g| g.id).collect();
        let mut by_game: HashMap<i32, Vec<reviews::Model>> = HashMap::new();
        for review in Reviews::find()
            .filter(reviews::Column::GameId.is_in(ids))
            .all(db)
            .await?
        {
            by_game.entry(review.game_id).or_default().push(review);
        }

        Ok(games
            .into_iter()
            .map(|game| {
                let reviews = by_game.remove(&game.id).unwrap_or_default();
                GameWithReviews { game, reviews }
            })
            .collect())
    }

    async fn count_by(
        db: &DatabaseConnection,
        column: games::Column,
    ) -> Result<Vec<NameCount>, DbErr> {
        let rows: Vec<(String, i64)> = Games::find()
            .select_only()
            .column(column)
            .column_as(games::Column::Id.count(), "count")
            .group_by(column)
            .into_tuple()
            .all(db)
            .await?;
        Ok(into_distribution(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_key_folds_unicode() {
        assert_eq!(search_key("Ōkami HD", "Clover Studio"), "ōkami hd\u{1f}clover studio");
    }

    #[test]
    fn sort_names_are_camel_case() {
        assert_eq!(GameSort::parse("releaseYear"), Some(GameSort::ReleaseYear));
        assert_eq!(GameSort::parse("release_year"), None);
    }
}
