// ==========================================
// 工会折扣系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接、仓储和API实例
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{DiscountApi, UserApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::repository::{CityRepository, DiscountRepository, PartnerRepository, UserRepository};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 共享连接
    pub conn: Arc<Mutex<Connection>>,

    /// 用户API
    pub user_api: Arc<UserApi>,

    /// 折扣API
    pub discount_api: Arc<DiscountApi>,

    /// 导入配置（config_kv）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并应用统一 PRAGMA
    /// 2. 幂等建表
    /// 3. 创建所有Repository与API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        Self::from_connection(db_path, conn)
    }

    /// 基于内存数据库创建（测试用）
    pub fn in_memory() -> Result<Self, String> {
        let conn = crate::db::open_in_memory().map_err(|e| format!("无法打开内存数据库: {}", e))?;
        Self::from_connection(":memory:".to_string(), conn)
    }

    fn from_connection(db_path: String, conn: Connection) -> Result<Self, String> {
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;

        match read_schema_version(&conn) {
            Ok(Some(v)) if v > CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    "数据库 schema_version={} 高于当前代码期望的 {}，请确认程序版本",
                    v,
                    CURRENT_SCHEMA_VERSION
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("读取 schema_version 失败(将继续启动): {}", e),
        }

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let partner_repo = Arc::new(PartnerRepository::from_connection(conn.clone()));
        let city_repo = Arc::new(CityRepository::from_connection(conn.clone()));
        let discount_repo = Arc::new(DiscountRepository::from_connection(conn.clone()));
        let user_repo = Arc::new(UserRepository::from_connection(conn.clone()));

        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));

        // ==========================================
        // 初始化API层
        // ==========================================
        let user_api = Arc::new(UserApi::new(user_repo, city_repo.clone()));
        let discount_api = Arc::new(DiscountApi::new(
            conn.clone(),
            partner_repo,
            city_repo,
            discount_repo,
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            conn,
            user_api,
            discount_api,
            config_manager,
        })
    }
}
