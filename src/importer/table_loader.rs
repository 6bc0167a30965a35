// ==========================================
// 工会折扣系统 - 折扣表加载器
// ==========================================
// 失败策略: 任何读取/解析错误只记日志并返回空表，不向上传播
// 调用方无法区分“文件为空”与“加载失败”
// ==========================================

use crate::importer::file_parser::{RawRecord, UniversalFileParser};
use std::path::Path;
use tracing::{error, info, instrument};

/// 行式内存表（仅含非空行，保持原顺序）
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiscountTable {
    records: Vec<RawRecord>,
}

impl DiscountTable {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }
}

/// 加载折扣表（第一个工作表）
pub fn load_discount_table<P: AsRef<Path>>(file_path: P) -> DiscountTable {
    load_discount_table_from_sheet(file_path, None)
}

/// 加载折扣表（可指定工作表）
#[instrument(skip_all, fields(file_path = %file_path.as_ref().display()))]
pub fn load_discount_table_from_sheet<P: AsRef<Path>>(
    file_path: P,
    sheet_name: Option<String>,
) -> DiscountTable {
    let parser = UniversalFileParser::new(sheet_name);
    match parser.parse(file_path.as_ref()) {
        Ok(records) => {
            info!(rows = records.len(), "折扣表加载完成");
            DiscountTable::new(records)
        }
        Err(e) => {
            error!(error = %e, "加载折扣表失败，返回空表");
            DiscountTable::empty()
        }
    }
}
