// ==========================================
// 工会折扣系统 - 用户 API
// ==========================================
// 职责: 按外部账号获取/创建用户，设置用户城市
// 城市匹配: CityKey（TRIM + 小写折叠），与导入一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::CityKey;
use crate::domain::user::User;
use crate::repository::city_repo::CityRepository;
use crate::repository::user_repo::UserRepository;

/// 用户视图（对外输出）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub gab_id: String,
    pub city: Option<String>,
}

pub struct UserApi {
    user_repo: Arc<UserRepository>,
    city_repo: Arc<CityRepository>,
}

impl UserApi {
    pub fn new(user_repo: Arc<UserRepository>, city_repo: Arc<CityRepository>) -> Self {
        Self {
            user_repo,
            city_repo,
        }
    }

    fn validate_gab_id(gab_id: &str) -> ApiResult<&str> {
        let trimmed = gab_id.trim();
        if trimmed.is_empty() {
            return Err(ApiError::InvalidInput("gab_id不能为空".to_string()));
        }
        Ok(trimmed)
    }

    fn load_or_create(&self, gab_id: &str) -> ApiResult<User> {
        if let Some(user) = self.user_repo.find_by_gab_id(gab_id)? {
            return Ok(user);
        }

        let id = self.user_repo.insert(gab_id)?;
        info!(user_id = id, gab_id = %gab_id, "创建用户");
        self.user_repo
            .find_by_gab_id(gab_id)?
            .ok_or_else(|| ApiError::InternalError(format!("用户{}创建后无法读取", gab_id)))
    }

    fn to_view(&self, user: User) -> ApiResult<UserView> {
        let city = match user.city_id {
            Some(city_id) => self.city_repo.find_by_id(city_id)?.map(|c| c.name),
            None => None,
        };
        Ok(UserView {
            gab_id: user.gab_id,
            city,
        })
    }

    /// 获取用户，不存在则创建
    pub fn get_or_create_user(&self, gab_id: &str) -> ApiResult<UserView> {
        let gab_id = Self::validate_gab_id(gab_id)?;
        let user = self.load_or_create(gab_id)?;
        self.to_view(user)
    }

    /// 设置用户所在城市
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): 城市不存在（城市只能由导入或管理接口创建）
    pub fn set_user_city(&self, gab_id: &str, city_name: &str) -> ApiResult<UserView> {
        let gab_id = Self::validate_gab_id(gab_id)?;
        let key = CityKey::from_name(city_name)
            .ok_or_else(|| ApiError::InvalidInput("城市名称不能为空".to_string()))?;

        let city = self
            .city_repo
            .find_by_key(&key)?
            .ok_or_else(|| ApiError::NotFound(format!("城市{}不存在", city_name.trim())))?;

        let user = self.load_or_create(gab_id)?;
        self.user_repo.update_city(user.id, Some(city.id))?;
        info!(gab_id = %gab_id, city = %city.name, "更新用户城市");

        Ok(UserView {
            gab_id: user.gab_id,
            city: Some(city.name),
        })
    }
}
