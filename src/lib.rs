// ==========================================
// 工会折扣系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + calamine
// 系统定位: 工会合作伙伴折扣的导入与查询后端
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装与启动导入
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{City, CityKey, Discount, ImportSummary, MissingCityPolicy, Partner, User};

// 导入
pub use importer::{load_discount_table, DiscountImporter, DiscountTable, ImportError};

// 存储
pub use repository::{DiscountStore, SqliteDiscountStore};

// API
pub use api::{DiscountApi, UserApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "工会折扣系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
