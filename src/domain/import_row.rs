// ==========================================
// 工会折扣系统 - 导入行模型
// ==========================================
// 用途: 字段映射后的中间结构（尚未落库）
// ==========================================

use serde::{Deserialize, Serialize};

/// 映射后的折扣导入行
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiscountRow {
    pub row_number: usize, // 源文件行号（表头为第 1 行，首个数据行为 2）

    pub partner_name: Option<String>,
    pub city_field: Option<String>, // 逗号分隔的城市列表（原样）
    pub description: Option<String>,
    pub corpcard_discount: Option<String>,
    pub union_discount: Option<String>,
}

/// 一次导入的汇总统计
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub total_rows: usize,
    pub processed_rows: usize,
    pub skipped_rows: usize,

    pub partners_created: usize,
    pub cities_created: usize,
    pub discounts_created: usize,
    pub discounts_existing: usize, // 已存在而跳过的折扣
    pub empty_city_tokens: usize,

    pub elapsed_ms: i64,
}
