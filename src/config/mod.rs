// ==========================================
// 工会折扣系统 - 配置层
// ==========================================
// 职责: 进程级配置（环境变量）+ 导入配置（config_kv 覆写）
// ==========================================

pub mod app_config;
pub mod config_manager;
pub mod import_config;

// 重导出核心配置
pub use app_config::{get_default_db_path, AppConfig};
pub use config_manager::{config_keys, ConfigManager};
pub use import_config::{ImportColumns, ImportConfigReader, ImportSettings};
