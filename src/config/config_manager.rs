// ==========================================
// 工会折扣系统 - 配置管理器
// ==========================================
// 职责: 从 config_kv 表读取导入配置覆写
// 存储: config_kv 表 (scope_id='global')
// ==========================================

use crate::config::import_config::{ImportColumns, ImportConfigReader};
use crate::db::open_sqlite_connection;
use crate::domain::types::MissingCityPolicy;
use crate::importer::error::{ImportError, ImportResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// 配置键定义
pub mod config_keys {
    pub const COLUMN_PARTNER: &str = "import/column/partner";
    pub const COLUMN_CITY: &str = "import/column/city";
    pub const COLUMN_DESCRIPTION: &str = "import/column/description";
    pub const COLUMN_CORPCARD: &str = "import/column/corpcard";
    pub const COLUMN_UNION: &str = "import/column/union";
    pub const MISSING_CITY_POLICY: &str = "import/missing_city_policy";
    pub const SHEET_NAME: &str = "import/sheet_name";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    pub fn new(db_path: &str) -> ImportResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ImportResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: format!("锁获取失败: {}", e),
        })?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| ImportError::ConfigReadError {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        // 空白值视为未配置
        Ok(value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }))
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ImportResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（upsert）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ImportResult<()> {
        let conn = self.conn.lock().map_err(|e| ImportError::ConfigReadError {
            key: key.to_string(),
            message: format!("锁获取失败: {}", e),
        })?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取导入配置快照（JSON格式，用于导入日志）
    pub fn config_snapshot(&self) -> ImportResult<String> {
        let settings = self.load_import_settings()?;
        let snapshot = json!({
            "columns": settings.columns,
            "missing_city_policy": settings.missing_city_policy,
            "sheet_name": settings.sheet_name,
        });
        Ok(snapshot.to_string())
    }
}

impl ImportConfigReader for ConfigManager {
    fn get_import_columns(&self) -> ImportResult<ImportColumns> {
        let defaults = ImportColumns::default();
        Ok(ImportColumns {
            partner: self.get_config_or_default(config_keys::COLUMN_PARTNER, &defaults.partner)?,
            city: self.get_config_or_default(config_keys::COLUMN_CITY, &defaults.city)?,
            description: self
                .get_config_or_default(config_keys::COLUMN_DESCRIPTION, &defaults.description)?,
            corpcard: self.get_config_or_default(config_keys::COLUMN_CORPCARD, &defaults.corpcard)?,
            union: self.get_config_or_default(config_keys::COLUMN_UNION, &defaults.union)?,
        })
    }

    fn get_missing_city_policy(&self) -> ImportResult<MissingCityPolicy> {
        match self.get_config_value(config_keys::MISSING_CITY_POLICY)? {
            None => Ok(MissingCityPolicy::default()),
            Some(raw) => {
                MissingCityPolicy::from_str(&raw).ok_or_else(|| ImportError::ConfigValueError {
                    key: config_keys::MISSING_CITY_POLICY.to_string(),
                    value: raw,
                })
            }
        }
    }

    fn get_sheet_name(&self) -> ImportResult<Option<String>> {
        self.get_config_value(config_keys::SHEET_NAME)
    }
}
