// ==========================================
// 工会折扣系统 - 导入层
// ==========================================
// 职责: 外部 Excel/CSV → 内部 partners / cities / partners_discounts
// 流程: 加载 (table_loader) → 映射 (field_mapper) → 对账落库 (discount_importer)
// ==========================================

pub mod data_cleaner;
pub mod discount_importer;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod table_loader;

// 重导出核心类型
pub use data_cleaner::{CitySplit, DataCleaner};
pub use discount_importer::DiscountImporter;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
pub use table_loader::{load_discount_table, load_discount_table_from_sheet, DiscountTable};
