// ==========================================
// 工会折扣系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod city_repo;
pub mod discount_repo;
pub mod discount_store;
pub mod error;
pub mod partner_repo;
pub mod user_repo;

// 重导出核心仓储
pub use city_repo::CityRepository;
pub use discount_repo::DiscountRepository;
pub use discount_store::{DiscountStore, DiscountUnit, SqliteDiscountStore};
pub use error::{RepositoryError, RepositoryResult};
pub use partner_repo::PartnerRepository;
pub use user_repo::UserRepository;
