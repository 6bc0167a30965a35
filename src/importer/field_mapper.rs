// ==========================================
// 工会折扣系统 - 字段映射器实现
// ==========================================
// 职责: 原始行 (列名 → 文本) → DiscountRow
// 列名由 ImportColumns 决定（可通过 config_kv 覆写）
// ==========================================

use crate::config::import_config::ImportColumns;
use crate::domain::import_row::DiscountRow;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::file_parser::RawRecord;

pub struct FieldMapper {
    columns: ImportColumns,
    cleaner: DataCleaner,
}

impl FieldMapper {
    pub fn new(columns: ImportColumns) -> Self {
        Self {
            columns,
            cleaner: DataCleaner,
        }
    }

    pub fn columns(&self) -> &ImportColumns {
        &self.columns
    }

    /// 映射单行
    ///
    /// 缺失的列与空白单元格一律映射为 None，是否可接受由导入器判断
    pub fn map_row(&self, record: &RawRecord) -> DiscountRow {
        let field = |column: &str| self.cleaner.normalize_null(record.get(column));

        DiscountRow {
            row_number: record.row_number,
            partner_name: field(&self.columns.partner),
            city_field: field(&self.columns.city),
            description: field(&self.columns.description),
            corpcard_discount: field(&self.columns.corpcard),
            union_discount: field(&self.columns.union),
        }
    }
}
