use std::path::{Path, PathBuf};

/// 数据目录布局
pub const DB_DATA_DIR: &str = "data";
pub const DB_FILE_NAME: &str = "game_tracker.db";
pub const RESOURCE_DIR: &str = "resources";

/// 可执行文件旁存在 `resources/data/game_tracker.db` 时启用便携模式
pub fn is_portable_mode() -> bool {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let portable_data_dir = exe_dir.join(RESOURCE_DIR).join(DB_DATA_DIR);
            let portable_db_file = portable_data_dir.join(DB_FILE_NAME);
            return portable_data_dir.exists() && portable_db_file.exists();
        }
    }
    false
}

/// 所有持久化数据的根目录
pub fn get_base_data_dir() -> Result<PathBuf, String> {
    if is_portable_mode() {
        let exe_path =
            std::env::current_exe().map_err(|e| format!("cannot resolve executable path: {}", e))?;
        let exe_dir = exe_path
            .parent()
            .ok_or_else(|| "executable has no parent directory".to_string())?;
        Ok(exe_dir.join(RESOURCE_DIR))
    } else {
        get_system_data_dir()
    }
}

fn get_system_data_dir() -> Result<PathBuf, String> {
    use directories::BaseDirs;

    let base_dirs = BaseDirs::new().ok_or_else(|| "no home directory available".to_string())?;

    #[cfg(any(target_os = "windows", target_os = "macos"))]
    {
        Ok(base_dirs.data_dir().join("com.gametracker.app"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        Ok(base_dirs.data_dir().join("game-tracker"))
    }
}

/// SQLite 数据库文件的默认位置
pub fn get_db_path() -> Result<PathBuf, String> {
    Ok(get_base_data_dir()?.join(DB_DATA_DIR).join(DB_FILE_NAME))
}

/// 为文件路径构建读写创建模式（rwc）的 SQLite 连接 URL
pub fn path_to_sqlite_url(path: &Path) -> Result<String, String> {
    let db_url = url::Url::from_file_path(path)
        .map_err(|_| format!("invalid database path: {}", path.display()))?;
    Ok(format!("sqlite:{}?mode=rwc", db_url.path()))
}

/// 从 SQLite URL 中提取文件路径，内存或非 SQLite URL 返回 `None`
pub fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url.strip_prefix("sqlite:")?;
    let rest = rest.split('?').next().unwrap_or_default();
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    if rest.is_empty() || rest == ":memory:" {
        return None;
    }
    Some(PathBuf::from(rest))
}
