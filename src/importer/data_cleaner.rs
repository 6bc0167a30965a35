// ==========================================
// 工会折扣系统 - 数据清洗器实现
// ==========================================
// 职责: NULL 标准化 + 城市字段拆分
// ==========================================

/// 城市字段拆分结果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CitySplit {
    /// 非空城市名（保持原顺序，不去重）
    pub names: Vec<String>,
    /// 被丢弃的空白片段数
    pub empty_tokens: usize,
}

pub struct DataCleaner;

impl DataCleaner {
    /// 标准化 NULL 值（空字符串/空白 → None）
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 按逗号拆分城市字段
    ///
    /// 规则:
    /// - 每个片段 TRIM
    /// - 空片段丢弃并计数
    /// - 同一行内重复城市不去重（由折扣存在性检查兜底）
    pub fn split_city_field(&self, raw: &str) -> CitySplit {
        let mut split = CitySplit::default();
        for token in raw.split(',') {
            let name = token.trim();
            if name.is_empty() {
                split.empty_tokens += 1;
            } else {
                split.names.push(name.to_string());
            }
        }
        split
    }
}
