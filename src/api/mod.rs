// ==========================================
// 工会折扣系统 - API 层
// ==========================================
// 职责: 供外部 HTTP 层调用的业务接口（本 crate 不含路由）
// ==========================================

pub mod discount_api;
pub mod error;
pub mod user_api;

// 重导出核心API
pub use discount_api::{DiscountApi, DiscountView, NewPartner, NewPartnerDiscount, PartnerView};
pub use error::{ApiError, ApiResult};
pub use user_api::{UserApi, UserView};
