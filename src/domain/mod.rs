// ==========================================
// 工会折扣系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与值类型
// 红线: 不含数据访问逻辑
// ==========================================

pub mod city;
pub mod discount;
pub mod import_row;
pub mod partner;
pub mod types;
pub mod user;

// 重导出核心类型
pub use city::{City, NewCityRecord};
pub use discount::{Discount, NewDiscountRecord};
pub use import_row::{DiscountRow, ImportSummary};
pub use partner::{NewPartnerRecord, Partner};
pub use types::{CityKey, MissingCityPolicy};
pub use user::User;
