// ==========================================
// 工会折扣系统 - 折扣 API
// ==========================================
// 职责:
// 1. 按城市查询折扣
// 2. 城市 / 合作伙伴列表
// 3. 直接创建合作伙伴及其折扣（单事务）
// ==========================================

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::city::City;
use crate::domain::discount::{Discount, NewDiscountRecord};
use crate::domain::partner::{NewPartnerRecord, Partner};
use crate::domain::types::CityKey;
use crate::repository::city_repo::CityRepository;
use crate::repository::discount_repo::DiscountRepository;
use crate::repository::discount_store::{DiscountStore, DiscountUnit, SqliteDiscountStore};
use crate::repository::partner_repo::PartnerRepository;

// ==========================================
// DTO
// ==========================================

/// 折扣视图（带合作伙伴与城市名称）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountView {
    pub id: i64,
    pub partner: String,
    pub city: String,
    pub description: Option<String>,
    pub corpcard_discount: Option<String>,
    pub union_discount: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// 新建合作伙伴请求中的单条折扣
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewPartnerDiscount {
    pub city: String,
    pub description: Option<String>,
    pub corpcard_discount: Option<String>,
    pub union_discount: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// 新建合作伙伴请求
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewPartner {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub discounts: Vec<NewPartnerDiscount>,
}

/// 合作伙伴及其折扣
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerView {
    pub partner: Partner,
    pub discounts: Vec<DiscountView>,
}

// ==========================================
// DiscountApi
// ==========================================
pub struct DiscountApi {
    conn: Arc<Mutex<Connection>>,
    partner_repo: Arc<PartnerRepository>,
    city_repo: Arc<CityRepository>,
    discount_repo: Arc<DiscountRepository>,
}

impl DiscountApi {
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        partner_repo: Arc<PartnerRepository>,
        city_repo: Arc<CityRepository>,
        discount_repo: Arc<DiscountRepository>,
    ) -> Self {
        Self {
            conn,
            partner_repo,
            city_repo,
            discount_repo,
        }
    }

    /// 按城市查询折扣
    ///
    /// # 返回
    /// - Ok(vec![]): 城市不存在或无折扣
    pub fn list_discounts_by_city(&self, city_name: &str) -> ApiResult<Vec<DiscountView>> {
        let key = match CityKey::from_name(city_name) {
            Some(key) => key,
            None => return Ok(Vec::new()),
        };

        let city = match self.city_repo.find_by_key(&key)? {
            Some(city) => city,
            None => return Ok(Vec::new()),
        };

        let discounts = self.discount_repo.list_by_city(city.id)?;
        let mut partner_names: HashMap<i64, String> = HashMap::new();
        let mut views = Vec::with_capacity(discounts.len());

        for discount in discounts {
            if !partner_names.contains_key(&discount.partner_id) {
                let name = self
                    .partner_repo
                    .find_by_id(discount.partner_id)?
                    .map(|p| p.name)
                    .ok_or_else(|| {
                        ApiError::NotFound(format!("Partner(id={})不存在", discount.partner_id))
                    })?;
                partner_names.insert(discount.partner_id, name);
            }
            let partner = partner_names[&discount.partner_id].clone();
            views.push(to_view(discount, partner, city.name.clone()));
        }

        Ok(views)
    }

    pub fn list_cities(&self) -> ApiResult<Vec<City>> {
        Ok(self.city_repo.list_all()?)
    }

    pub fn list_partners(&self) -> ApiResult<Vec<Partner>> {
        Ok(self.partner_repo.list_all()?)
    }

    /// 创建合作伙伴及其折扣
    ///
    /// 规则:
    /// - 合作伙伴名称已存在 → Duplicate
    /// - 引用的城市不存在 → NotFound（此路径不自动创建城市）
    /// - 同一城市出现两次 → Duplicate
    /// - 任一失败整体回滚
    pub fn create_partner(&self, request: NewPartner) -> ApiResult<PartnerView> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("合作伙伴名称不能为空".to_string()));
        }

        let mut store = SqliteDiscountStore::from_connection(self.conn.clone());
        let view = store.run_unit(|unit| Self::create_partner_in_unit(unit, name, &request))?;

        info!(
            partner = %view.partner.name,
            discounts = view.discounts.len(),
            "创建合作伙伴"
        );
        Ok(view)
    }

    fn create_partner_in_unit(
        unit: &mut dyn DiscountUnit,
        name: &str,
        request: &NewPartner,
    ) -> ApiResult<PartnerView> {
        if unit.find_partner_by_name(name)?.is_some() {
            return Err(ApiError::Duplicate(format!("合作伙伴{}已存在", name)));
        }

        let partner = unit.create_partner(&NewPartnerRecord {
            name: name.to_string(),
            description: request.description.clone(),
        })?;

        let mut discounts = Vec::with_capacity(request.discounts.len());
        for item in &request.discounts {
            let key = CityKey::from_name(&item.city)
                .ok_or_else(|| ApiError::InvalidInput("城市名称不能为空".to_string()))?;
            let city = unit
                .find_city(&key)?
                .ok_or_else(|| ApiError::NotFound(format!("城市{}不存在", item.city.trim())))?;

            if unit.find_discount(partner.id, city.id)?.is_some() {
                return Err(ApiError::Duplicate(format!(
                    "合作伙伴{}在城市{}的折扣重复",
                    partner.name, city.name
                )));
            }

            let discount = unit.create_discount(&NewDiscountRecord {
                partner_id: partner.id,
                city_id: city.id,
                description: item.description.clone(),
                corpcard_discount: item.corpcard_discount.clone(),
                union_discount: item.union_discount.clone(),
                start_date: item.start_date,
                end_date: item.end_date,
            })?;
            discounts.push(to_view(discount, partner.name.clone(), city.name));
        }

        Ok(PartnerView { partner, discounts })
    }
}

fn to_view(discount: Discount, partner: String, city: String) -> DiscountView {
    DiscountView {
        id: discount.id,
        partner,
        city,
        description: discount.description,
        corpcard_discount: discount.corpcard_discount,
        union_discount: discount.union_discount,
        start_date: discount.start_date,
        end_date: discount.end_date,
    }
}
