// ==========================================
// 工会折扣系统 - 启动导入
// ==========================================
// 顺序: 读取导入配置 → 加载折扣表 → 对账导入
// 导入完成（或显式跳过）之前，应用不对外服务
// ==========================================

use std::path::Path;
use tracing::{info, instrument};

use crate::app::state::AppState;
use crate::config::import_config::ImportConfigReader;
use crate::domain::import_row::ImportSummary;
use crate::importer::{load_discount_table_from_sheet, DiscountImporter, ImportResult};
use crate::repository::SqliteDiscountStore;

/// 执行启动导入
///
/// # 返回
/// - Ok(ImportSummary): 导入完成（文件缺失/损坏时表为空，结果为空汇总）
/// - Err: 导入中途失败（失败行已回滚）
#[instrument(skip(state, excel_path), fields(excel_path = %excel_path.as_ref().display()))]
pub fn run_startup_import<P: AsRef<Path>>(
    state: &AppState,
    excel_path: P,
) -> ImportResult<ImportSummary> {
    let settings = state.config_manager.load_import_settings()?;
    info!(config = %state.config_manager.config_snapshot()?, "导入配置");

    let table = load_discount_table_from_sheet(excel_path.as_ref(), settings.sheet_name.clone());

    // store 随 import_table 返回而释放
    let store = SqliteDiscountStore::from_connection(state.conn.clone());
    DiscountImporter::new(store, &settings).import_table(&table)
}
