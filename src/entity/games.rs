//! 游戏库条目。
//!
//! `genre` 与 `platform` 存储规范的 [`Genre`](super::vocabulary::Genre) 与
//! [`Platform`](super::vocabulary::Platform) 字符串，写入均经过 DTO 校验。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub genre: String,
    #[sea_orm(column_type = "Text")]
    pub platform: String,
    pub release_year: i32,
    #[sea_orm(column_type = "Text")]
    pub developer: String,
    #[sea_orm(column_type = "Text")]
    pub cover_image: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub completed: bool,
    /// 小写的标题与开发商，供游戏库搜索匹配
    #[serde(skip)]
    #[sea_orm(column_type = "Text")]
    pub search_text: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::reviews::Entity")]
    Reviews,
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
