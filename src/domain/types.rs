// ==========================================
// 工会折扣系统 - 领域类型定义
// ==========================================
// 职责: 城市身份键、导入策略等值类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 城市身份键 (City Key)
// ==========================================
// 规则: TRIM + 小写折叠
// 导入与 API 查询统一使用，保证同一城市只有一种身份
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CityKey(String);

impl CityKey {
    /// 由城市名称生成规范键
    ///
    /// # 返回
    /// - Some(CityKey): 名称非空
    /// - None: 名称为空或全为空白
    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_lowercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// 城市字段缺失策略 (Missing City Policy)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与 config_kv 一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissingCityPolicy {
    SkipRowCities, // 仅落库合作伙伴，跳过城市与折扣
    Strict,        // 中止导入
}

impl MissingCityPolicy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SKIP_ROW_CITIES" => Some(MissingCityPolicy::SkipRowCities),
            "STRICT" => Some(MissingCityPolicy::Strict),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MissingCityPolicy::SkipRowCities => "SKIP_ROW_CITIES",
            MissingCityPolicy::Strict => "STRICT",
        }
    }
}

impl Default for MissingCityPolicy {
    fn default() -> Self {
        MissingCityPolicy::SkipRowCities
    }
}

impl fmt::Display for MissingCityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
