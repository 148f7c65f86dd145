//! 挂载在 `/api` 下的 REST API。

pub mod error;
pub mod games;
pub mod metadata;
pub mod response;
pub mod reviews;
pub mod router;
pub mod system;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::metadata::igdb::IgdbClient;
use crate::metadata::moby::MobyClient;
use crate::metadata::MetadataError;

/// 各处理函数共享的状态
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub igdb: Arc<IgdbClient>,
    pub moby: Arc<MobyClient>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &Config) -> Result<Self, MetadataError> {
        Ok(Self {
            db,
            igdb: Arc::new(IgdbClient::new(&config.igdb, config.http_timeout_secs)?),
            moby: Arc::new(MobyClient::new(&config.moby, config.http_timeout_secs)?),
        })
    }
}
