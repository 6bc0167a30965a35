// ==========================================
// 工会折扣系统 - 进程级配置
// ==========================================
// 来源: 环境变量（带默认值）
// ==========================================

use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "UNION_DISCOUNTS_DB_PATH";
pub const ENV_EXCEL_PATH: &str = "UNION_DISCOUNTS_EXCEL_PATH";
pub const ENV_SKIP_IMPORT: &str = "UNION_DISCOUNTS_SKIP_IMPORT";

pub const DEFAULT_EXCEL_PATH: &str = "data/discounts.xlsx";
const DB_FILE_NAME: &str = "union_discounts.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub excel_path: PathBuf,
    /// 启动时跳过 Excel 导入
    pub skip_import: bool,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载（便于测试）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = non_empty(ENV_DB_PATH).unwrap_or_else(get_default_db_path);
        let excel_path = non_empty(ENV_EXCEL_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXCEL_PATH));
        let skip_import = non_empty(ENV_SKIP_IMPORT)
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            db_path,
            excel_path,
            skip_import,
        }
    }
}

/// 默认数据库路径
///
/// 优先使用用户数据目录；拿不到时回退到当前目录
pub fn get_default_db_path() -> String {
    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("union-discounts");
        // best-effort: 目录创建失败则回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}
