// ==========================================
// 工会折扣系统 - 城市领域模型
// ==========================================
// 对齐: cities 表
// ==========================================

use crate::domain::types::CityKey;
use serde::{Deserialize, Serialize};

// ==========================================
// City - 城市
// ==========================================
// 自然键: name_key (规范化名称，全局唯一)
// 导入路径只填写 name，region/经纬度由其他渠道维护
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String, // 首次出现时的写法
    pub name_key: String,
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// 待创建的城市
#[derive(Debug, Clone, PartialEq)]
pub struct NewCityRecord {
    pub name: String,
    pub key: CityKey,
}

impl NewCityRecord {
    /// 由显示名称构造；名称为空时返回 None
    pub fn from_name(name: &str) -> Option<Self> {
        CityKey::from_name(name).map(|key| Self {
            name: name.trim().to_string(),
            key,
        })
    }
}
