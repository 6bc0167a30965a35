// ==========================================
// 工会折扣系统 - 应用层
// ==========================================
// 职责: 组装共享状态，执行启动导入
// ==========================================

pub mod startup;
pub mod state;

// 重导出
pub use startup::run_startup_import;
pub use state::AppState;
