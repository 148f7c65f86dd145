//! 评测数据仓库。

use std::collections::HashMap;

use crate::database::dto::{NewReview, ReviewChanges, ReviewQuery};
use crate::database::repository::{into_distribution, percentage, NameCount};
use crate::entity::prelude::*;
use crate::entity::{games, reviews};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::*;
use serde::{Deserialize, Serialize};

/// 可排序的评测字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewSort {
    #[default]
    CreatedAt,
    UpdatedAt,
    Score,
    HoursPlayed,
    Difficulty,
    Recommended,
}

impl ReviewSort {
    pub fn parse(name: &str) -> Option<Self> {
        let sort = match name {
            "createdAt" => ReviewSort::CreatedAt,
            "updatedAt" => ReviewSort::UpdatedAt,
            "score" => ReviewSort::Score,
            "hoursPlayed" => ReviewSort::HoursPlayed,
            "difficulty" => ReviewSort::Difficulty,
            "recommended" => ReviewSort::Recommended,
            _ => return None,
        };
        Some(sort)
    }

    fn column(self) -> reviews::Column {
        match self {
            ReviewSort::CreatedAt => reviews::Column::CreatedAt,
            ReviewSort::UpdatedAt => reviews::Column::UpdatedAt,
            ReviewSort::Score => reviews::Column::Score,
            ReviewSort::HoursPlayed => reviews::Column::HoursPlayed,
            ReviewSort::Difficulty => reviews::Column::Difficulty,
            ReviewSort::Recommended => reviews::Column::Recommended,
        }
    }
}

/// 评测列表筛选条件，评分上下限均包含边界
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewFilter {
    pub game_id: Option<i32>,
    pub min_score: Option<i32>,
    pub max_score: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub recommended: Option<bool>,
}

impl ReviewFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(game_id) = self.game_id {
            condition = condition.add(reviews::Column::GameId.eq(game_id));
        }
        if let Some(min) = self.min_score {
            condition = condition.add(reviews::Column::Score.gte(min));
        }
        if let Some(max) = self.max_score {
            condition = condition.add(reviews::Column::Score.lte(max));
        }
        if let Some(difficulty) = self.difficulty {
            condition = condition.add(reviews::Column::Difficulty.eq(difficulty.as_str()));
        }
        if let Some(recommended) = self.recommended {
            condition = condition.add(reviews::Column::Recommended.eq(recommended));
        }
        condition
    }
}

/// 评测中附带展示的游戏字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub id: i32,
    pub title: String,
    pub cover_image: String,
    pub genre: String,
    pub platform: String,
    pub developer: String,
}

impl From<&games::Model> for GameSummary {
    fn from(game: &games::Model) -> Self {
        Self {
            id: game.id,
            title: game.title.clone(),
            cover_image: game.cover_image.clone(),
            genre: game.genre.clone(),
            platform: game.platform.clone(),
            developer: game.developer.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewWithGame {
    #[serde(flatten)]
    pub review: reviews::Model,
    pub game: Option<GameSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOverview {
    pub average_score: f64,
    pub average_hours_played: f64,
    pub total_hours_played: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreCount {
    pub score: i32,
    pub count: u64,
}

/// 评测统计
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub total_reviews: u64,
    pub recommended_reviews: u64,
    pub recommendation_percentage: u32,
    pub overview: ReviewOverview,
    pub score_distribution: Vec<ScoreCount>,
    pub difficulty_distribution: Vec<NameCount>,
}

/// 评测数据仓库
pub struct ReviewsRepository;

impl ReviewsRepository {
    // ==================== 基础 CRUD 操作 ====================

    /// 插入评测。游戏必须存在且尚无评测，
    /// 并发下漏过检查的重复评测由 `game_id` 唯一索引拒绝。
    pub async fn insert(
        db: &DatabaseConnection,
        review: NewReview,
    ) -> Result<reviews::Model, DbErr> {
        let now = chrono::Utc::now();

        let review_active = reviews::ActiveModel {
            id: NotSet,
            game_id: Set(review.game_id),
            score: Set(review.score),
            text: Set(review.text),
            hours_played: Set(review.hours_played),
            difficulty: Set(review.difficulty.as_str().to_string()),
            recommended: Set(review.recommended),
            created_at: Set(now),
            updated_at: Set(now),
        };

        review_active.insert(db).await
    }

    /// 部分更新评测，评测不存在时返回 `None`
    pub async fn update(
        db: &DatabaseConnection,
        review_id: i32,
        changes: ReviewChanges,
    ) -> Result<Option<reviews::Model>, DbErr> {
        let review_active = reviews::ActiveModel {
            id: Set(review_id),
            score: changes.score.map_or(NotSet, Set),
            text: changes.text.map_or(NotSet, Set),
            hours_played: changes.hours_played.map_or(NotSet, Set),
            difficulty: changes
                .difficulty
                .map_or(NotSet, |d| Set(d.as_str().to_string())),
            recommended: changes.recommended.map_or(NotSet, Set),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        match review_active.update(db).await {
            Ok(review) => Ok(Some(review)),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
        let result = Reviews::delete_by_id(id).exec(db).await?;
        Ok(result.rows_affected > 0)
    }

    // ==================== 查询操作 ====================

    pub async fn find_with_game(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<ReviewWithGame>, DbErr> {
        let found = Reviews::find_by_id(id)
            .find_also_related(Games)
            .one(db)
            .await?;
        Ok(found.map(|(review, game)| ReviewWithGame {
            review,
            game: game.as_ref().map(GameSummary::from),
        }))
    }

    pub async fn find_by_game(
        db: &DatabaseConnection,
        game_id: i32,
    ) -> Result<Vec<reviews::Model>, DbErr> {
        Reviews::find()
            .filter(reviews::Column::GameId.eq(game_id))
            .order_by_desc(reviews::Column::CreatedAt)
            .all(db)
            .await
    }

    pub async fn exists_for_game(db: &DatabaseConnection, game_id: i32) -> Result<bool, DbErr> {
        let count = Reviews::find()
            .filter(reviews::Column::GameId.eq(game_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    /// 按条件查询一页评测，并返回匹配总数
    pub async fn find_page(
        db: &DatabaseConnection,
        query: &ReviewQuery,
    ) -> Result<(Vec<ReviewWithGame>, u64), DbErr> {
        let select = Reviews::find().filter(query.filter.condition());
        let total = select.clone().count(db).await?;

        let order: Order = query.order.into();
        let reviews = select
            .order_by(query.sort.column(), order.clone())
            .order_by(reviews::Column::Id, order)
            .offset(query.page.offset())
            .limit(query.page.limit)
            .all(db)
            .await?;

        Ok((Self::attach_games(db, reviews).await?, total))
    }

    pub async fn summary(db: &DatabaseConnection) -> Result<ReviewSummary, DbErr> {
        let total_reviews = Reviews::find().count(db).await?;
        let recommended_reviews = Reviews::find()
            .filter(reviews::Column::Recommended.eq(true))
            .count(db)
            .await?;

        let (average_score, average_hours, total_hours): (Option<f64>, Option<f64>, Option<f64>) =
            Reviews::find()
                .select_only()
                .column_as(
                    SimpleExpr::from(Func::avg(Expr::col(reviews::Column::Score))),
                    "average_score",
                )
                .column_as(
                    SimpleExpr::from(Func::avg(Expr::col(reviews::Column::HoursPlayed))),
                    "average_hours_played",
                )
                .column_as(
                    SimpleExpr::from(Func::sum(Expr::col(reviews::Column::HoursPlayed))),
                    "total_hours_played",
                )
                .into_tuple()
                .one(db)
                .await?
                .unwrap_or((None, None, None));

        let score_distribution: Vec<(i32, i64)> = Reviews::find()
            .select_only()
            .column(reviews::Column::Score)
            .column_as(reviews::Column::Id.count(), "count")
            .group_by(reviews::Column::Score)
            .order_by_asc(reviews::Column::Score)
            .into_tuple()
            .all(db)
            .await?;

        let difficulty_distribution: Vec<(String, i64)> = Reviews::find()
            .select_only()
            .column(reviews::Column::Difficulty)
            .column_as(reviews::Column::Id.count(), "count")
            .group_by(reviews::Column::Difficulty)
            .into_tuple()
            .all(db)
            .await?;

        Ok(ReviewSummary {
            total_reviews,
            recommended_reviews,
            recommendation_percentage: percentage(recommended_reviews, total_reviews),
            overview: ReviewOverview {
                average_score: round2(average_score.unwrap_or(0.0)),
                average_hours_played: round2(average_hours.unwrap_or(0.0)),
                total_hours_played: round2(total_hours.unwrap_or(0.0)),
            },
            score_distribution: score_distribution
                .into_iter()
                .map(|(score, count)| ScoreCount {
                    score,
                    count: count.max(0) as u64,
                })
                .collect(),
            difficulty_distribution: into_distribution(difficulty_distribution),
        })
    }

    // ==================== 私有辅助函数 ====================

    async fn attach_games(
        db: &DatabaseConnection,
        reviews: Vec<reviews::Model>,
    ) -> Result<Vec<ReviewWithGame>, DbErr> {
        if reviews.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = reviews.iter().map(|r| r.game_id).collect();
        let games: HashMap<i32, GameSummary> = Games::find()
            .filter(games::Column::Id.is_in(ids))
            .all(db)
            .await?
            .iter()
            .map(|g| (g.id, GameSummary::from(g)))
            .collect();

        Ok(reviews
            .into_iter()
            .map(|review| {
                let game = games.get(&review.game_id).cloned();
                ReviewWithGame { review, game }
            })
            .collect())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_names_are_camel_case() {
        assert_eq!(ReviewSort::parse("hoursPlayed"), Some(ReviewSort::HoursPlayed));
        assert_eq!(ReviewSort::parse("hours_played"), None);
        assert_eq!(ReviewSort::default(), ReviewSort::CreatedAt);
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(3.456), 3.46);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(10.0 / 3.0), 3.33);
    }
}
