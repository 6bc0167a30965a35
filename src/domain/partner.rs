// ==========================================
// 工会折扣系统 - 合作伙伴领域模型
// ==========================================
// 对齐: partners 表
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Partner - 工会合作伙伴
// ==========================================
// 自然键: name (全局唯一)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: i64,                     // 自增主键
    pub name: String,                // 合作伙伴名称
    pub description: Option<String>, // 描述
}

/// 待创建的合作伙伴（尚无主键）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPartnerRecord {
    pub name: String,
    pub description: Option<String>,
}
