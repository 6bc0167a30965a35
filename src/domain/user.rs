// ==========================================
// 工会折扣系统 - 用户领域模型
// ==========================================
// 对齐: users 表
// 自然键: gab_id (外部账号)
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub gab_id: String,
    pub city_id: Option<i64>,
}
