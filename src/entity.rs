//! 数据实体。
//!
//! SeaORM 表模型，以及存储在文本列中的固定词表。

pub mod prelude;

pub mod vocabulary;

// === SeaORM 实体（每表一个） ===
pub mod games;
pub mod reviews;
