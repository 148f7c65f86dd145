//! SeaORM 实体的简短别名。

pub use super::games::Entity as Games;
pub use super::reviews::Entity as Reviews;

pub use super::vocabulary::{Difficulty, Genre, Platform};
