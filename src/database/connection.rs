use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, RuntimeErr};
use std::fs;
use std::time::Duration;

/// SQLite 连接池设置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    /// 单连接内存数据库，供测试使用
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

/// 为文件型 SQLite 数据库创建所在目录
pub fn ensure_db_dir_exists(database_url: &str) -> Result<(), String> {
    let Some(db_path) = tracker_path::sqlite_file_path(database_url) else {
        return Ok(());
    };
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                format!("cannot create database directory {}: {}", parent.display(), e)
            })?;
            log::info!("Created database directory: {}", parent.display());
        }
    }
    Ok(())
}

/// 建立 SeaORM 数据库连接
pub async fn establish_connection(
    settings: &DatabaseSettings,
) -> Result<DatabaseConnection, DbErr> {
    ensure_db_dir_exists(&settings.url).map_err(|e| DbErr::Conn(RuntimeErr::Internal(e)))?;

    let max_connections = settings.max_connections.max(1);
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    log::info!(
        "Connecting to database {} (pool size {})",
        settings.url,
        max_connections
    );
    Database::connect(options).await
}

/// 关闭数据库连接
pub async fn close_connection(conn: DatabaseConnection) -> Result<(), DbErr> {
    conn.close().await?;
    Ok(())
}
