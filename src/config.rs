use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};

use crate::database::connection::DatabaseSettings;

pub const DEFAULT_IGDB_API_BASE: &str = "https://api.igdb.com/v4";
pub const DEFAULT_MOBY_API_BASE: &str = "https://api.mobygames.com/v1";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot resolve the default database location: {0}")]
    DataDir(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgdbConfig {
    pub client_id: Option<String>,
    pub access_token: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobyConfig {
    pub api_key: Option<String>,
    pub api_base: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseSettings,
    pub cors_origin: String,
    pub http_timeout_secs: u64,
    pub igdb: IgdbConfig,
    pub moby: MobyConfig,
}

impl Config {
    /// 从进程环境变量读取
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 通过任意键值查找构建配置，缺失或无法解析的值
    /// 使用默认值。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match non_blank(&lookup, "DATABASE_URL") {
            Some(url) => url,
            None => {
                let path = tracker_path::get_db_path().map_err(ConfigError::DataDir)?;
                let url = tracker_path::path_to_sqlite_url(&path).map_err(ConfigError::DataDir)?;
                info!("DATABASE_URL not set, using default: {url}");
                url
            }
        };

        Ok(Self {
            host: try_load(&lookup, "HOST", "0.0.0.0".to_string()),
            port: try_load(&lookup, "PORT", 8000u16),
            database: DatabaseSettings {
                url: database_url,
                max_connections: try_load(&lookup, "DB_MAX_CONNECTIONS", 1u32).max(1),
            },
            cors_origin: try_load(&lookup, "CORS_ORIGIN", "http://localhost:3000".to_string()),
            http_timeout_secs: try_load(&lookup, "HTTP_TIMEOUT_SECS", 10u64),
            igdb: IgdbConfig {
                client_id: non_blank(&lookup, "IGDB_CLIENT_ID"),
                access_token: non_blank(&lookup, "IGDB_ACCESS_TOKEN"),
                api_base: try_load(&lookup, "IGDB_API_BASE", DEFAULT_IGDB_API_BASE.to_string()),
            },
            moby: MobyConfig {
                api_key: non_blank(&lookup, "MOBY_API_KEY"),
                api_base: try_load(&lookup, "MOBY_API_BASE", DEFAULT_MOBY_API_BASE.to_string()),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match non_blank(lookup, key) {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}; using default: {default}");
            default
        }),
    }
}
