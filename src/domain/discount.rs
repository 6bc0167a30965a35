// ==========================================
// 工会折扣系统 - 折扣领域模型
// ==========================================
// 对齐: partners_discounts 表
// 约束: (partner_id, city_id) 至多一条
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Discount - 合作伙伴在某城市的折扣
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub id: i64,
    pub partner_id: i64,
    pub city_id: i64,

    // ===== 折扣内容 =====
    pub description: Option<String>,       // 描述
    pub corpcard_discount: Option<String>, // 企业卡折扣
    pub union_discount: Option<String>,    // 工会卡折扣

    // ===== 有效期 (导入路径不填写) =====
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// 待创建的折扣
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewDiscountRecord {
    pub partner_id: i64,
    pub city_id: i64,
    pub description: Option<String>,
    pub corpcard_discount: Option<String>,
    pub union_discount: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
