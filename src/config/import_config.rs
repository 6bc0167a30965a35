// ==========================================
// 工会折扣系统 - 导入配置
// ==========================================
// 职责: 表头列名、城市缺失策略、工作表选择
// 红线: 不包含配置写入
// ==========================================

use crate::domain::types::MissingCityPolicy;
use crate::importer::error::ImportResult;
use serde::{Deserialize, Serialize};

/// 默认表头（源 Excel 使用的本地化列名）
pub const DEFAULT_PARTNER_COLUMN: &str = "Партнер";
pub const DEFAULT_CITY_COLUMN: &str = "Город";
pub const DEFAULT_DESCRIPTION_COLUMN: &str = "Описание";
pub const DEFAULT_CORPCARD_COLUMN: &str = "Корп. карта";
pub const DEFAULT_UNION_COLUMN: &str = "РосПрофЖел";

// ==========================================
// ImportColumns - 表头列名映射
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportColumns {
    pub partner: String,
    pub city: String,
    pub description: String,
    pub corpcard: String,
    pub union: String,
}

impl Default for ImportColumns {
    fn default() -> Self {
        Self {
            partner: DEFAULT_PARTNER_COLUMN.to_string(),
            city: DEFAULT_CITY_COLUMN.to_string(),
            description: DEFAULT_DESCRIPTION_COLUMN.to_string(),
            corpcard: DEFAULT_CORPCARD_COLUMN.to_string(),
            union: DEFAULT_UNION_COLUMN.to_string(),
        }
    }
}

// ==========================================
// ImportSettings - 一次导入使用的全部配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportSettings {
    pub columns: ImportColumns,
    pub missing_city_policy: MissingCityPolicy,
    pub sheet_name: Option<String>,
}

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（config_kv 表）、ImportSettings（静态配置）
pub trait ImportConfigReader {
    /// 获取表头列名映射
    ///
    /// # 默认值
    /// - Партнер / Город / Описание / Корп. карта / РосПрофЖел
    fn get_import_columns(&self) -> ImportResult<ImportColumns>;

    /// 获取城市字段缺失策略
    ///
    /// # 默认值
    /// - SKIP_ROW_CITIES
    fn get_missing_city_policy(&self) -> ImportResult<MissingCityPolicy>;

    /// 获取工作表名称（None 表示第一个工作表）
    fn get_sheet_name(&self) -> ImportResult<Option<String>>;

    /// 汇总为 ImportSettings
    fn load_import_settings(&self) -> ImportResult<ImportSettings> {
        Ok(ImportSettings {
            columns: self.get_import_columns()?,
            missing_city_policy: self.get_missing_city_policy()?,
            sheet_name: self.get_sheet_name()?,
        })
    }
}

impl ImportConfigReader for ImportSettings {
    fn get_import_columns(&self) -> ImportResult<ImportColumns> {
        Ok(self.columns.clone())
    }

    fn get_missing_city_policy(&self) -> ImportResult<MissingCityPolicy> {
        Ok(self.missing_city_policy)
    }

    fn get_sheet_name(&self) -> ImportResult<Option<String>> {
        Ok(self.sheet_name.clone())
    }
}
