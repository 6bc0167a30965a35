// ==========================================
// 工会折扣系统 - 主入口
// ==========================================
// 启动顺序: 日志 → 配置 → 数据库 → Excel 导入 → 就绪
// ==========================================

use anyhow::{anyhow, Context, Result};
use union_discounts::app::{run_startup_import, AppState};
use union_discounts::config::AppConfig;
use union_discounts::logging;

fn main() -> Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", union_discounts::APP_NAME);
    tracing::info!("系统版本: {}", union_discounts::VERSION);
    tracing::info!("==================================================");

    let config = AppConfig::from_env();
    tracing::info!("使用数据库: {}", config.db_path);

    let state = AppState::new(config.db_path.clone()).map_err(|e| anyhow!(e))?;

    if config.skip_import {
        tracing::info!("已配置跳过启动导入");
    } else {
        let summary = run_startup_import(&state, &config.excel_path)
            .with_context(|| format!("导入失败: {}", config.excel_path.display()))?;
        tracing::info!(
            summary = %serde_json::to_string(&summary)?,
            "启动导入完成"
        );
    }

    tracing::info!("应用已就绪");
    Ok(())
}
